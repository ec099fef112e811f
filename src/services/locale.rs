/// Source of the user's OS locale (e.g. `ja-JP`, `en_US.UTF-8`).
pub trait LocaleProvider {
    fn locale_name(&self) -> String;
}

/// Reads the POSIX locale variables in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvLocale;

impl LocaleProvider for EnvLocale {
    fn locale_name(&self) -> String {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}

/// Fixed locale, for tests and explicit overrides.
#[derive(Debug, Clone)]
pub struct FixedLocale(pub String);

impl FixedLocale {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl LocaleProvider for FixedLocale {
    fn locale_name(&self) -> String {
        self.0.clone()
    }
}

/// Language name for a locale: Japanese locales map to `Japanese`, anything
/// else to `English`.
pub fn language_for_locale(locale: &str) -> &'static str {
    if locale.to_ascii_lowercase().starts_with("ja") {
        "Japanese"
    } else {
        "English"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for_locale() {
        assert_eq!(language_for_locale("ja-JP"), "Japanese");
        assert_eq!(language_for_locale("ja_JP.UTF-8"), "Japanese");
        assert_eq!(language_for_locale("en-US"), "English");
        assert_eq!(language_for_locale(""), "English");
        assert_eq!(language_for_locale("de_DE"), "English");
    }

    #[test]
    fn test_fixed_locale() {
        assert_eq!(FixedLocale::new("ja-JP").locale_name(), "ja-JP");
    }
}
