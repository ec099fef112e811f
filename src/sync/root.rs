use crate::events::SettingsEvent;
use crate::ipc::{CompositeScope, Message, MessageSender, names::receive, names::send};
use crate::services::locale::{LocaleProvider, language_for_locale};
use crate::sync::{
    ExternalTrackerSettingSync, GamepadSettingSync, LayoutSettingSync, LightSettingSync,
    MotionSettingSync, SettingCategorySync, SyncedField, WindowSettingSync,
    WordToMotionSettingSync,
};
use std::sync::Arc;

/// Language names accepted in `preferredLanguage`.
pub const AVAILABLE_LANGUAGES: [&str; 2] = ["Japanese", "English"];

/// Language value meaning "not chosen yet, follow the OS locale".
pub const DEFAULT_LANGUAGE: &str = "Default";

/// Which character was loaded last.
///
/// The live identity has at most one side non-empty. An identity decoded
/// from a file may carry both until a load decides between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterIdentity {
    pub file_path: String,
    pub remote_id: String,
}

impl CharacterIdentity {
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
            remote_id: String::new(),
        }
    }

    pub fn remote(id: impl Into<String>) -> Self {
        Self {
            file_path: String::new(),
            remote_id: id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_path.is_empty() && self.remote_id.is_empty()
    }
}

/// Result of routing one inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundAction {
    /// A category applied it silently.
    Applied,
    /// Applied, and the UI should hear about it.
    Notify(SettingsEvent),
    /// Nobody handles this command.
    Ignored,
}

/// The whole synchronized configuration tree.
///
/// Lives on the settings context, which is its only mutator. All outbound
/// traffic goes through the shared [`MessageSender`].
pub struct RootSettingSync {
    sender: Arc<dyn MessageSender>,

    pub window: WindowSettingSync,
    pub motion: MotionSettingSync,
    pub layout: LayoutSettingSync,
    pub gamepad: GamepadSettingSync,
    pub light: LightSettingSync,
    pub word_to_motion: WordToMotionSettingSync,
    pub external_tracker: ExternalTrackerSettingSync,

    /// Local only: whether startup reopens the last character.
    pub auto_load_last_loaded_vrm: SyncedField<bool>,
    pub language_name: SyncedField<String>,
    /// Local only: send `RequestAutoAdjustEyebrow` after a character loads.
    pub auto_adjust_eyebrow_on_loaded: SyncedField<bool>,

    identity: CharacterIdentity,
    language_initialized: bool,
}

impl RootSettingSync {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self {
            window: WindowSettingSync::new(&sender),
            motion: MotionSettingSync::new(&sender),
            layout: LayoutSettingSync::new(&sender),
            gamepad: GamepadSettingSync::new(&sender),
            light: LightSettingSync::new(&sender),
            word_to_motion: WordToMotionSettingSync::new(&sender),
            external_tracker: ExternalTrackerSettingSync::new(&sender),
            auto_load_last_loaded_vrm: SyncedField::local(false),
            language_name: SyncedField::new(&sender, send::LANGUAGE, DEFAULT_LANGUAGE.to_string()),
            auto_adjust_eyebrow_on_loaded: SyncedField::local(true),
            identity: CharacterIdentity::default(),
            language_initialized: false,
            sender,
        }
    }

    pub fn sender(&self) -> &Arc<dyn MessageSender> {
        &self.sender
    }

    pub fn character_identity(&self) -> CharacterIdentity {
        self.identity.clone()
    }

    /// Put back an identity captured earlier with [`Self::character_identity`].
    pub fn restore_character_identity(&mut self, identity: CharacterIdentity) {
        self.identity = identity;
    }

    pub fn last_loaded_character_file_path(&self) -> &str {
        &self.identity.file_path
    }

    pub fn last_loaded_character_remote_id(&self) -> &str {
        &self.identity.remote_id
    }

    pub fn on_local_model_loaded(&mut self, path: impl Into<String>) {
        self.identity = CharacterIdentity::local(path);
    }

    pub fn on_remote_model_loaded(&mut self, model_id: impl Into<String>) {
        self.identity = CharacterIdentity::remote(model_id);
    }

    pub fn request_eyebrow_adjust_if_enabled(&self) {
        if self.auto_adjust_eyebrow_on_loaded.value() {
            self.motion.request_auto_adjust_eyebrow();
        }
    }

    /// Select a UI language. Names outside [`AVAILABLE_LANGUAGES`] are refused.
    pub fn set_language(&mut self, name: &str) -> bool {
        if !AVAILABLE_LANGUAGES.contains(&name) {
            tracing::warn!("Ignoring unknown language {}", name);
            return false;
        }
        self.language_name.apply_local(name.to_string());
        true
    }

    /// Resolve `"Default"` from the OS locale.
    ///
    /// Meant to run after the auto-save was loaded. The provider is consulted
    /// at most once per process.
    pub fn initialize_language_if_needed(&mut self, locale: &dyn LocaleProvider) {
        if self.language_initialized {
            return;
        }
        self.language_initialized = true;

        if self.language_name.get() == DEFAULT_LANGUAGE {
            let name = language_for_locale(&locale.locale_name());
            tracing::info!("No language chosen yet, using {} from the OS locale", name);
            self.language_name.apply_local(name.to_string());
        }
    }

    /// Reset everything except language in one transaction.
    pub fn reset_to_default(&mut self) {
        let sender = self.sender.clone();
        let _scope = CompositeScope::open(sender.as_ref());

        self.auto_load_last_loaded_vrm.reset_to_default();
        self.auto_adjust_eyebrow_on_loaded.reset_to_default();
        self.identity = CharacterIdentity::default();

        self.window.reset_to_default();
        self.motion.reset_to_default();
        self.layout.reset_to_default();
        self.gamepad.reset_to_default();
        self.light.reset_to_default();
        self.word_to_motion.reset_to_default();
        self.external_tracker.reset_to_default();
    }

    pub fn handle_inbound(&mut self, message: &Message) -> InboundAction {
        match message.command.as_str() {
            receive::VROID_MODEL_LOAD_COMPLETED => {
                self.on_remote_model_loaded(message.content.clone());
                self.request_eyebrow_adjust_if_enabled();
                return InboundAction::Notify(SettingsEvent::RemoteCharacterLoaded {
                    model_id: message.content.clone(),
                });
            }
            receive::VROID_MODEL_LOAD_CANCELED => {
                return InboundAction::Notify(SettingsEvent::RemoteCharacterLoadCanceled);
            }
            receive::CLOSE_CONFIG_WINDOW => {
                return InboundAction::Notify(SettingsEvent::CloseConfigWindowRequested);
            }
            _ => {}
        }

        // Some commands (extra clip names) matter to more than one category
        let handled = [
            self.window.handle_inbound(message),
            self.motion.handle_inbound(message),
            self.layout.handle_inbound(message),
            self.gamepad.handle_inbound(message),
            self.light.handle_inbound(message),
            self.word_to_motion.handle_inbound(message),
            self.external_tracker.handle_inbound(message),
        ];

        if handled.contains(&true) {
            InboundAction::Applied
        } else {
            tracing::debug!("Ignoring inbound command {}", message.command);
            InboundAction::Ignored
        }
    }
}
