// Settings event hub
//
// Notifications for the UI layer. The settings context publishes, any number
// of listeners subscribe through a tokio broadcast channel.

use crate::services::indication::MessageIndication;
use camino::Utf8PathBuf;
use tokio::sync::broadcast;

/// Events emitted by the settings context
///
/// These let the UI react (dialogs, reloads, closing) without the sync layer
/// knowing anything about the UI framework.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsEvent {
    /// A loaded setting refers to a remote character; the UI should confirm
    /// (see [`MessageIndication::load_vrm_confirmation`]) and start the load
    RemoteCharacterLoadRequested {
        model_id: String,
    },

    /// Renderer finished loading a remote character
    RemoteCharacterLoaded {
        model_id: String,
    },

    /// Renderer's remote character load was canceled
    RemoteCharacterLoadCanceled,

    /// `OpenVrm` was sent for a local character file
    LocalCharacterOpened {
        path: Utf8PathBuf,
    },

    /// Renderer asks the configurator window to close
    CloseConfigWindowRequested,

    /// Answer to a device or clip name query
    NameListReceived {
        kind: NameListKind,
        names: Vec<String>,
    },

    /// Slot (0 = auto-save) was written
    SettingsSaved {
        slot: usize,
    },

    /// Slot (0 = auto-save) was applied
    SettingsLoaded {
        slot: usize,
    },

    /// Whole tree was reset to defaults
    SettingsReset,

    /// User-visible failure of a save/load operation
    OperationFailed(MessageIndication),
}

/// Which name list a renderer query returned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameListKind {
    Microphone,
    Camera,
    CustomMotionClip,
}

/// Broadcast hub for [`SettingsEvent`]s
pub struct EventHub {
    tx: broadcast::Sender<SettingsEvent>,
}

impl EventHub {
    /// Create a hub with a buffer of 100 events
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SettingsEvent) {
        tracing::debug!("Settings event: {:?}", event);
        // Ignore send errors - it's OK if no one is listening
        let _ = self.tx.send(event);
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventHub {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}
