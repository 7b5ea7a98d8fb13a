//! Language registry: Single source of truth for all supported languages.
//!
//! Each entry maps a language code to the content resource that holds its
//! bundle and to the locale tag written onto the document. The registry is a
//! lazily initialised `OnceLock` singleton and is immutable after first use.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Short language code used by selectors and storage (e.g., "zh", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "Japanese")
    pub name: &'static str,

    /// Native name of the language (e.g., "日本語")
    pub native_name: &'static str,

    /// Resource key of the content bundle (e.g., "content.ja.json")
    pub resource_key: &'static str,

    /// Locale tag written onto the document root (e.g., "zh-TW")
    pub html_lang: &'static str,

    /// Whether this is the default language (exactly one should be true)
    pub is_default: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// Matching is exact: codes are stored lowercase and callers are
    /// expected to pass what the selector or storage handed them.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in registry order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the default language configuration.
    ///
    /// # Panics
    /// Panics if no default language is found or if several are defined
    /// (this indicates a configuration error in `default_languages`).
    pub fn default_language(&self) -> &LanguageConfig {
        let defaults: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default language found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// Default language configurations: Traditional Chinese (default), English,
/// Japanese and Korean.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "zh",
            name: "Chinese",
            native_name: "中文",
            resource_key: "content.zh.json",
            html_lang: "zh-TW",
            is_default: true,
            enabled: true,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            resource_key: "content.en.json",
            html_lang: "en",
            is_default: false,
            enabled: true,
        },
        LanguageConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
            resource_key: "content.ja.json",
            html_lang: "ja",
            is_default: false,
            enabled: true,
        },
        LanguageConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
            resource_key: "content.ko.json",
            html_lang: "ko",
            is_default: false,
            enabled: true,
        },
    ]
}
