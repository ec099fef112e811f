// Numbered save slots
//
// Slot 0 is the auto-save written on shutdown; slots 1..=FILE_COUNT are the
// user's. Files are created on first save, overwritten afterwards and never
// deleted.

use crate::events::{EventHub, SettingsEvent};
use crate::ipc::{Message, names::send};
use crate::services::indication::{Language, MessageIndication};
use crate::services::setting_file::{
    DecodeError, LoadScope, LoadSelection, SaveFileMode, SettingFileCodec, SettingFileError,
    SettingFileIo,
};
use crate::sync::{CharacterIdentity, RootSettingSync};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::time::SystemTime;
use thiserror::Error;

/// Number of user slots. Valid user indices are `1..=FILE_COUNT`.
pub const FILE_COUNT: usize = 3;

/// Slot index of the auto-save.
pub const AUTO_SAVE_INDEX: usize = 0;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Slot {0} has no saved setting")]
    SlotNotFound(usize),

    #[error("Slot {0} is out of range")]
    InvalidSlot(usize),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: Utf8PathBuf,
        source: DecodeError,
    },

    #[error("Failed to encode setting file: {0}")]
    Encode(#[from] serde_yaml_ng::Error),
}

impl From<SettingFileError> for SlotError {
    fn from(err: SettingFileError) -> Self {
        match err {
            SettingFileError::Read { path, source } | SettingFileError::Write { path, source } => {
                Self::Io { path, source }
            }
            SettingFileError::Decode { path, source } => Self::Decode { path, source },
            SettingFileError::Encode(e) => Self::Encode(e),
        }
    }
}

impl SlotError {
    pub fn load_indication(&self, lang: Language) -> MessageIndication {
        match self {
            Self::SlotNotFound(index) => MessageIndication::slot_not_found(lang, *index),
            other => MessageIndication::load_failed(lang, &other.to_string()),
        }
    }

    pub fn save_indication(&self, lang: Language) -> MessageIndication {
        MessageIndication::save_failed(lang, &self.to_string())
    }
}

/// What happened to the character when a slot was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterLoad {
    Unchanged,
    /// `OpenVrm` was sent for this file.
    LocalFileOpened(Utf8PathBuf),
    /// The UI has to confirm and start a remote model load.
    RemoteRequested(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Neither character nor non-character settings were selected.
    NoOp,
    Loaded {
        index: usize,
        character: CharacterLoad,
    },
}

/// Listing entry for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOverview {
    pub index: usize,
    pub exists: bool,
    pub modified: Option<SystemTime>,
    pub character_label: Option<String>,
}

pub struct SaveSlotManager {
    dir: Utf8PathBuf,
    events: EventHub,
    latest_loaded_index: Option<usize>,
}

impl SaveSlotManager {
    pub fn new(dir: impl Into<Utf8PathBuf>, events: EventHub) -> Self {
        Self {
            dir: dir.into(),
            events,
            latest_loaded_index: None,
        }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// File path of `index` (0 = auto-save). Does not check the range.
    pub fn slot_path(&self, index: usize) -> Utf8PathBuf {
        if index == AUTO_SAVE_INDEX {
            self.dir.join("_autosave")
        } else {
            self.dir.join(format!("_save{}", index))
        }
    }

    pub fn slot_exists(&self, index: usize) -> bool {
        index <= FILE_COUNT && self.slot_path(index).is_file()
    }

    /// Slot most recently loaded in this session.
    pub fn latest_loaded_index(&self) -> Option<usize> {
        self.latest_loaded_index
    }

    /// Save the tree to user slot `index`, overwriting it.
    pub fn save(&self, root: &RootSettingSync, index: usize) -> Result<(), SlotError> {
        if index == AUTO_SAVE_INDEX || index > FILE_COUNT {
            return Err(SlotError::InvalidSlot(index));
        }
        self.write_slot(root, index)
    }

    pub fn save_auto_save(&self, root: &RootSettingSync) -> Result<(), SlotError> {
        self.write_slot(root, AUTO_SAVE_INDEX)
    }

    fn write_slot(&self, root: &RootSettingSync, index: usize) -> Result<(), SlotError> {
        fs::create_dir_all(&self.dir).map_err(|source| SlotError::Io {
            path: self.dir.clone(),
            source,
        })?;

        SettingFileIo::save(root, &self.slot_path(index), SaveFileMode::Internal)?;
        self.events.publish(SettingsEvent::SettingsSaved { slot: index });
        Ok(())
    }

    /// Load slot `index` (0 allowed) restricted to `selection`.
    ///
    /// Character identity is only changed through an actual character load
    /// at the end, so a partial load never leaves the identity pointing at a
    /// character the renderer is not showing. `from_automation` suppresses
    /// the remote load request, which always needs a user confirmation.
    pub fn load(
        &mut self,
        root: &mut RootSettingSync,
        index: usize,
        selection: LoadSelection,
        from_automation: bool,
    ) -> Result<LoadOutcome, SlotError> {
        // Out-of-range indices have no file either
        if !self.slot_exists(index) {
            tracing::warn!("Tried to load setting, but slot {} has no file", index);
            return Err(SlotError::SlotNotFound(index));
        }

        let Some(scope) = selection.scope() else {
            tracing::debug!("Load of slot {} requested with nothing selected", index);
            return Ok(LoadOutcome::NoOp);
        };

        let before = root.character_identity();

        // Decode fully before touching the tree
        let file = SettingFileIo::read(&self.slot_path(index))?;
        SettingFileCodec::apply(root, &file, SaveFileMode::Internal, scope);

        let loaded = root.character_identity();
        root.restore_character_identity(before.clone());

        let character = if scope.includes_character() {
            if loaded.file_path != before.file_path
                && !loaded.file_path.is_empty()
                && Utf8Path::new(&loaded.file_path).is_file()
            {
                self.open_local_character(root, &loaded.file_path)
            } else if loaded.remote_id != before.remote_id
                && !loaded.remote_id.is_empty()
                && !from_automation
            {
                self.request_remote_character(&loaded.remote_id)
            } else {
                CharacterLoad::Unchanged
            }
        } else {
            CharacterLoad::Unchanged
        };

        self.latest_loaded_index = Some(index);
        tracing::info!("Loaded slot {} ({:?}), character: {:?}", index, scope, character);
        self.events.publish(SettingsEvent::SettingsLoaded { slot: index });

        Ok(LoadOutcome::Loaded { index, character })
    }

    /// Apply the auto-save at startup, identity included.
    ///
    /// Returns `Ok(false)` on first run when there is no auto-save yet.
    pub fn load_auto_save(&mut self, root: &mut RootSettingSync) -> Result<bool, SlotError> {
        let path = self.slot_path(AUTO_SAVE_INDEX);
        if !path.is_file() {
            tracing::info!("No auto-save at {}, starting from defaults", path);
            return Ok(false);
        }

        SettingFileIo::load(root, &path, SaveFileMode::Internal, LoadScope::All)?;
        let identity = root.character_identity();
        if !identity.file_path.is_empty() && !identity.remote_id.is_empty() {
            root.restore_character_identity(settle_identity(identity));
        }
        self.events
            .publish(SettingsEvent::SettingsLoaded { slot: AUTO_SAVE_INDEX });
        Ok(true)
    }

    /// Reopen the last character once the auto-save is applied.
    ///
    /// Only acts when auto-load is on. Remote characters still go through
    /// the UI, which confirms before loading.
    pub fn auto_load_last_character(&self, root: &mut RootSettingSync) -> CharacterLoad {
        if !root.auto_load_last_loaded_vrm.value() {
            return CharacterLoad::Unchanged;
        }

        let identity = root.character_identity();
        if !identity.file_path.is_empty() {
            if Utf8Path::new(&identity.file_path).is_file() {
                return self.open_local_character(root, &identity.file_path);
            }
            tracing::warn!("Last loaded character {} no longer exists", identity.file_path);
            return CharacterLoad::Unchanged;
        }

        if !identity.remote_id.is_empty() {
            return self.request_remote_character(&identity.remote_id);
        }
        CharacterLoad::Unchanged
    }

    /// Write the tree to an arbitrary path for sharing.
    pub fn export_to(&self, root: &RootSettingSync, path: &Utf8Path) -> Result<(), SlotError> {
        SettingFileIo::save(root, path, SaveFileMode::Export)?;
        Ok(())
    }

    /// Apply a shared file. Character identity and language are never taken
    /// from it.
    pub fn import_from(&self, root: &mut RootSettingSync, path: &Utf8Path) -> Result<(), SlotError> {
        SettingFileIo::load(root, path, SaveFileMode::Export, LoadScope::All)?;
        Ok(())
    }

    pub fn overview(&self, index: usize) -> SlotOverview {
        let path = self.slot_path(index);
        if !self.slot_exists(index) {
            return SlotOverview {
                index,
                exists: false,
                modified: None,
                character_label: None,
            };
        }

        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        let character_label = match SettingFileIo::read(&path) {
            Ok(file) => file.character_label(),
            Err(e) => {
                tracing::debug!("Could not read slot {} for overview: {}", index, e);
                None
            }
        };

        SlotOverview {
            index,
            exists: true,
            modified,
            character_label,
        }
    }

    /// Overview of the auto-save and every user slot, in index order.
    pub fn overviews(&self) -> Vec<SlotOverview> {
        (AUTO_SAVE_INDEX..=FILE_COUNT).map(|i| self.overview(i)).collect()
    }

    fn open_local_character(&self, root: &mut RootSettingSync, path: &str) -> CharacterLoad {
        root.sender()
            .send_message(Message::new(send::OPEN_VRM, path));
        root.request_eyebrow_adjust_if_enabled();
        root.on_local_model_loaded(path);

        let path = Utf8PathBuf::from(path);
        self.events
            .publish(SettingsEvent::LocalCharacterOpened { path: path.clone() });
        CharacterLoad::LocalFileOpened(path)
    }

    fn request_remote_character(&self, model_id: &str) -> CharacterLoad {
        self.events.publish(SettingsEvent::RemoteCharacterLoadRequested {
            model_id: model_id.to_string(),
        });
        CharacterLoad::RemoteRequested(model_id.to_string())
    }
}

/// Pick one side of an identity that names both: the file while it still
/// exists, the remote model otherwise.
fn settle_identity(identity: CharacterIdentity) -> CharacterIdentity {
    if Utf8Path::new(&identity.file_path).is_file() {
        CharacterIdentity::local(identity.file_path)
    } else {
        CharacterIdentity::remote(identity.remote_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::test_support::RecordingSender;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SaveSlotManager, Arc<RecordingSender>, RootSettingSync) {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let recorder = Arc::new(RecordingSender::new());
        let root = RootSettingSync::new(recorder.clone());
        (dir, SaveSlotManager::new(path, EventHub::new()), recorder, root)
    }

    #[test]
    fn test_slot_paths() {
        let (_dir, slots, _, _) = setup();
        assert!(slots.slot_path(0).as_str().ends_with("_autosave"));
        assert!(slots.slot_path(2).as_str().ends_with("_save2"));
    }

    #[test]
    fn test_slot_exists_range() {
        let (_dir, slots, _, root) = setup();
        assert!(!slots.slot_exists(1));
        slots.save(&root, 1).unwrap();
        assert!(slots.slot_exists(1));
        assert!(!slots.slot_exists(4));
    }

    #[test]
    fn test_save_rejects_out_of_range() {
        let (_dir, slots, _, root) = setup();
        assert!(matches!(slots.save(&root, 0), Err(SlotError::InvalidSlot(0))));
        assert!(matches!(slots.save(&root, 4), Err(SlotError::InvalidSlot(4))));
    }

    #[test]
    fn test_missing_slot_sends_nothing() {
        let (_dir, mut slots, recorder, mut root) = setup();
        let result = slots.load(&mut root, 2, LoadSelection::ALL, false);
        assert!(matches!(result, Err(SlotError::SlotNotFound(2))));
        assert!(recorder.delivered().is_empty());
        assert_eq!(slots.latest_loaded_index(), None);
    }

    #[test]
    fn test_out_of_range_load_is_not_found() {
        let (_dir, mut slots, recorder, mut root) = setup();
        let result = slots.load(&mut root, FILE_COUNT + 2, LoadSelection::ALL, false);
        assert!(matches!(result, Err(SlotError::SlotNotFound(5))));
        assert!(recorder.delivered().is_empty());
    }

    #[test]
    fn test_nothing_selected_is_noop() {
        let (_dir, mut slots, recorder, mut root) = setup();
        root.window.top_most.apply_local(false);
        slots.save(&root, 1).unwrap();
        root.window.top_most.apply_local(true);
        recorder.clear();

        let outcome = slots
            .load(&mut root, 1, LoadSelection::new(false, false), false)
            .unwrap();
        assert_eq!(outcome, LoadOutcome::NoOp);
        assert!(recorder.delivered().is_empty());
        assert!(root.window.top_most.value());
    }

    #[test]
    fn test_not_found_indication() {
        let msg = SlotError::SlotNotFound(3).load_indication(Language::English);
        assert_eq!(msg, MessageIndication::slot_not_found(Language::English, 3));
    }
}
