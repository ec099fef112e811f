use crate::ipc::CompositeScope;
use crate::models::{CURRENT_VERSION, SettingFile};
use crate::sync::{AVAILABLE_LANGUAGES, CharacterIdentity, RootSettingSync, SettingCategorySync};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Whose file is being read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFileMode {
    /// Slots and the auto-save: identity, auto-load and language included.
    Internal,
    /// Files meant to be shared: those fields are written neutral and
    /// ignored on read.
    Export,
}

/// Field subset applied on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadScope {
    All,
    CharacterOnly,
    NonCharacterOnly,
}

impl LoadScope {
    pub fn includes_character(self) -> bool {
        self != Self::NonCharacterOnly
    }

    pub fn includes_non_character(self) -> bool {
        self != Self::CharacterOnly
    }
}

/// The two "load character" / "load other settings" choices of the load UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSelection {
    pub character: bool,
    pub non_character: bool,
}

impl LoadSelection {
    pub const ALL: Self = Self {
        character: true,
        non_character: true,
    };

    pub fn new(character: bool, non_character: bool) -> Self {
        Self {
            character,
            non_character,
        }
    }

    /// `None` when nothing was selected.
    pub fn scope(self) -> Option<LoadScope> {
        match (self.character, self.non_character) {
            (true, true) => Some(LoadScope::All),
            (true, false) => Some(LoadScope::CharacterOnly),
            (false, true) => Some(LoadScope::NonCharacterOnly),
            (false, false) => None,
        }
    }
}

impl Default for LoadSelection {
    /// Character only: switching outfits of the same avatar is the common case.
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Setting file is empty")]
    Empty,

    #[error("Malformed setting file: {0}")]
    Malformed(#[from] serde_yaml_ng::Error),
}

#[derive(Error, Debug)]
pub enum SettingFileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
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

/// Conversion between the live tree and [`SettingFile`] text.
pub struct SettingFileCodec;

impl SettingFileCodec {
    /// Snapshot the tree as file content.
    ///
    /// Identity is only written for internal saves with auto-load on; an
    /// export carries none of the gated fields.
    pub fn capture(root: &RootSettingSync, mode: SaveFileMode) -> SettingFile {
        let internal = mode == SaveFileMode::Internal;
        let auto_load = internal && root.auto_load_last_loaded_vrm.value();
        let identity = if auto_load {
            root.character_identity()
        } else {
            CharacterIdentity::default()
        };

        let mut layout = root.layout.save();
        // Nested for compatibility with older files
        layout.gamepad = Some(root.gamepad.save());

        SettingFile {
            version: CURRENT_VERSION,
            is_internal_save_file: internal,
            last_loaded_character_file_path: identity.file_path,
            last_loaded_character_remote_id: identity.remote_id,
            auto_load_last_loaded_vrm: auto_load,
            preferred_language: if internal {
                root.language_name.value()
            } else {
                String::new()
            },
            adjust_eyebrow_on_loaded: root.auto_adjust_eyebrow_on_loaded.value(),
            window: root.window.save(),
            motion: root.motion.save(),
            layout,
            light: root.light.save(),
            word_to_motion: root.word_to_motion.save(),
            external_tracker: Some(root.external_tracker.save()),
        }
    }

    pub fn encode_file(file: &SettingFile) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(file)
    }

    pub fn encode(root: &RootSettingSync, mode: SaveFileMode) -> Result<String, serde_yaml_ng::Error> {
        Self::encode_file(&Self::capture(root, mode))
    }

    /// Parse file text. Missing blocks and fields take their defaults.
    pub fn decode(text: &str) -> Result<SettingFile, DecodeError> {
        if text.trim().is_empty() {
            return Err(DecodeError::Empty);
        }

        let file: SettingFile = serde_yaml_ng::from_str(text)?;
        if file.version > CURRENT_VERSION {
            tracing::warn!(
                "Setting file version {} is newer than {}, unknown fields are ignored",
                file.version,
                CURRENT_VERSION
            );
        }
        Ok(file)
    }

    /// Apply decoded content to the tree inside one composite transaction.
    ///
    /// Gated fields are only taken from internal files read in internal
    /// mode. Identity needs a character scope; auto-load and language need
    /// the full scope. Category blocks need a non-character scope.
    pub fn apply(root: &mut RootSettingSync, file: &SettingFile, mode: SaveFileMode, scope: LoadScope) {
        let sender = root.sender().clone();
        let _scope = CompositeScope::open(sender.as_ref());

        let gated = mode == SaveFileMode::Internal && file.is_internal_save_file;

        // Both sides are kept; the caller picks one before it goes live
        if gated && scope.includes_character() {
            root.restore_character_identity(CharacterIdentity {
                file_path: file.last_loaded_character_file_path.clone(),
                remote_id: file.last_loaded_character_remote_id.clone(),
            });
        }

        if gated && scope == LoadScope::All {
            root.auto_load_last_loaded_vrm
                .apply_local(file.auto_load_last_loaded_vrm);
            if AVAILABLE_LANGUAGES.contains(&file.preferred_language.as_str()) {
                root.set_language(&file.preferred_language);
            }
        }

        if scope.includes_non_character() {
            root.auto_adjust_eyebrow_on_loaded
                .apply_local(file.adjust_eyebrow_on_loaded);
            root.window.load(&file.window);
            root.motion.load(&file.motion);
            root.layout.load(&file.layout);
            root.gamepad
                .load(&file.layout.gamepad.clone().unwrap_or_default());
            root.light.load(&file.light);
            root.word_to_motion.load(&file.word_to_motion);
            root.external_tracker
                .load(&file.external_tracker.clone().unwrap_or_default());
        }
    }
}

/// File-level save and load of the tree.
pub struct SettingFileIo;

impl SettingFileIo {
    pub fn save(root: &RootSettingSync, path: &Utf8Path, mode: SaveFileMode) -> Result<(), SettingFileError> {
        let text = SettingFileCodec::encode(root, mode)?;
        atomic_write(path, text.as_bytes()).map_err(|source| SettingFileError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved setting file to {} ({:?})", path, mode);
        Ok(())
    }

    /// Read and decode without touching the tree.
    pub fn read(path: &Utf8Path) -> Result<SettingFile, SettingFileError> {
        let text = fs::read_to_string(path).map_err(|source| SettingFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        SettingFileCodec::decode(&text).map_err(|source| SettingFileError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read, decode and apply. On error nothing was applied.
    pub fn load(
        root: &mut RootSettingSync,
        path: &Utf8Path,
        mode: SaveFileMode,
        scope: LoadScope,
    ) -> Result<SettingFile, SettingFileError> {
        let file = Self::read(path)?;
        SettingFileCodec::apply(root, &file, mode, scope);
        tracing::info!("Loaded setting file {} ({:?}, {:?})", path, mode, scope);
        Ok(file)
    }
}

/// Write to a sibling temp file, then rename over `path`.
fn atomic_write(path: &Utf8Path, content: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("tmp");

    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    Ok(())
}
