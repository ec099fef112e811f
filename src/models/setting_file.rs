use crate::models::settings::{
    ExternalTrackerSetting, LayoutSetting, LightSetting, MotionSetting, WindowSetting,
    WordToMotionSetting,
};
use serde::{Deserialize, Serialize};

/// Format version written by this build.
pub const CURRENT_VERSION: u32 = 2;

/// Files written before the `version` key existed.
fn legacy_version() -> u32 {
    1
}

/// Content of one setting file (slot, auto-save or export).
///
/// Every field has a default so older or hand-edited files still load.
/// Gated fields (identity, auto-load, language) are neutral in files written
/// with `is_internal_save_file == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingFile {
    #[serde(default = "legacy_version")]
    pub version: u32,

    pub is_internal_save_file: bool,
    pub last_loaded_character_file_path: String,
    pub last_loaded_character_remote_id: String,
    #[serde(alias = "autoLoadLastLoadedCharacter")]
    pub auto_load_last_loaded_vrm: bool,
    pub preferred_language: String,
    /// Not gated, shared files carry it too.
    pub adjust_eyebrow_on_loaded: bool,

    pub window: WindowSetting,
    pub motion: MotionSetting,
    pub layout: LayoutSetting,
    pub light: LightSetting,
    pub word_to_motion: WordToMotionSetting,

    /// Absent in version 1 files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_tracker: Option<ExternalTrackerSetting>,
}

impl Default for SettingFile {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            is_internal_save_file: false,
            last_loaded_character_file_path: String::new(),
            last_loaded_character_remote_id: String::new(),
            auto_load_last_loaded_vrm: false,
            preferred_language: String::new(),
            adjust_eyebrow_on_loaded: true,
            window: WindowSetting::default(),
            motion: MotionSetting::default(),
            layout: LayoutSetting::default(),
            light: LightSetting::default(),
            word_to_motion: WordToMotionSetting::default(),
            external_tracker: None,
        }
    }
}

impl SettingFile {
    /// Display label for the character this file refers to.
    pub fn character_label(&self) -> Option<String> {
        if !self.last_loaded_character_file_path.is_empty() {
            let path = camino::Utf8Path::new(&self.last_loaded_character_file_path);
            return Some(
                path.file_name()
                    .unwrap_or(self.last_loaded_character_file_path.as_str())
                    .to_string(),
            );
        }
        if !self.last_loaded_character_remote_id.is_empty() {
            return Some(format!("VRoid Hub: {}", self.last_loaded_character_remote_id));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_version_reads_as_legacy() {
        let file: SettingFile = serde_yaml_ng::from_str("isInternalSaveFile: true\n").unwrap();
        assert_eq!(file.version, 1);
        assert!(file.is_internal_save_file);
        assert!(file.external_tracker.is_none());
        assert!(file.layout.gamepad.is_none());
    }

    #[test]
    fn test_default_file_is_current_version() {
        assert_eq!(SettingFile::default().version, CURRENT_VERSION);
    }

    #[test]
    fn test_missing_eyebrow_flag_defaults_on() {
        let file: SettingFile = serde_yaml_ng::from_str("version: 2\n").unwrap();
        assert!(file.adjust_eyebrow_on_loaded);

        let file: SettingFile =
            serde_yaml_ng::from_str("adjustEyebrowOnLoaded: false\n").unwrap();
        assert!(!file.adjust_eyebrow_on_loaded);
    }

    #[test]
    fn test_auto_load_alias() {
        let file: SettingFile =
            serde_yaml_ng::from_str("autoLoadLastLoadedCharacter: true\n").unwrap();
        assert!(file.auto_load_last_loaded_vrm);
    }

    #[test]
    fn test_character_label() {
        let mut file = SettingFile::default();
        assert_eq!(file.character_label(), None);

        file.last_loaded_character_remote_id = "12345".into();
        assert_eq!(file.character_label().as_deref(), Some("VRoid Hub: 12345"));

        file.last_loaded_character_file_path = "/models/alicia.vrm".into();
        assert_eq!(file.character_label().as_deref(), Some("alicia.vrm"));
    }
}
