// User-facing message texts
//
// Only the handful of dialogs this layer raises. General UI localization is
// not handled here.

use serde::{Deserialize, Serialize};

/// UI language as stored in `preferredLanguage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    Japanese,
    #[default]
    English,
}

impl Language {
    /// Unknown names (including `"Default"`) fall back to English.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Japanese" => Self::Japanese,
            _ => Self::English,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Japanese => "Japanese",
            Self::English => "English",
        }
    }
}

/// Title and body of a message box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageIndication {
    pub title: String,
    pub content: String,
}

impl MessageIndication {
    fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Asked before loading a character from the remote model service.
    pub fn load_vrm_confirmation(lang: Language) -> Self {
        match lang {
            Language::Japanese => Self::new(
                "VRMの読み込み",
                "ビューアー画面のライセンスを確認してください。読み込みますか？",
            ),
            Language::English => Self::new(
                "Load VRM",
                "Please confirm the license in viewer window. Do you load the character?",
            ),
        }
    }

    pub fn confirm_setting_file_load(lang: Language, index: usize) -> Self {
        match lang {
            Language::Japanese => Self::new(
                "設定のロード",
                format!("スロット{}の設定をロードしますか？", index),
            ),
            Language::English => Self::new(
                "Load Setting",
                format!("Load the setting from slot {}?", index),
            ),
        }
    }

    pub fn confirm_setting_file_save(lang: Language, index: usize) -> Self {
        match lang {
            Language::Japanese => Self::new(
                "設定のセーブ",
                format!("現在の設定をスロット{}にセーブしますか？", index),
            ),
            Language::English => Self::new(
                "Save Setting",
                format!("Save the current setting to slot {}?", index),
            ),
        }
    }

    pub fn slot_not_found(lang: Language, index: usize) -> Self {
        match lang {
            Language::Japanese => Self::new(
                "設定のロード",
                format!("スロット{}にはセーブデータがありません。", index),
            ),
            Language::English => Self::new(
                "Load Setting",
                format!("Slot {} has no saved setting.", index),
            ),
        }
    }

    pub fn load_failed(lang: Language, detail: &str) -> Self {
        match lang {
            Language::Japanese => Self::new(
                "設定のロード",
                format!("設定ファイルを読み込めませんでした: {}", detail),
            ),
            Language::English => Self::new(
                "Load Setting",
                format!("Failed to load the setting file: {}", detail),
            ),
        }
    }

    pub fn save_failed(lang: Language, detail: &str) -> Self {
        match lang {
            Language::Japanese => Self::new(
                "設定のセーブ",
                format!("設定ファイルを保存できませんでした: {}", detail),
            ),
            Language::English => Self::new(
                "Save Setting",
                format!("Failed to save the setting file: {}", detail),
            ),
        }
    }
}
