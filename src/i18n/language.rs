//! Language type: validated language representation.
//!
//! A `Language` can only be built from a registry entry, so a value of this
//! type is always a supported, enabled language. Raw input (selector data,
//! stored preferences) goes through `from_code` or `normalize_or`.

use crate::error::ContentError;
use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Serialize, Serializer};
use std::fmt;

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const CHINESE: Language = Language { code: "zh" };
    pub const ENGLISH: Language = Language { code: "en" };
    pub const JAPANESE: Language = Language { code: "ja" };
    pub const KOREAN: Language = Language { code: "ko" };

    /// Create a Language from a code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered and enabled
    /// * `Err(ContentError::UnsupportedLanguage)` otherwise
    pub fn from_code(code: &str) -> Result<Language, ContentError> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            _ => Err(ContentError::UnsupportedLanguage {
                code: code.to_string(),
            }),
        }
    }

    /// Resolve `code`, substituting `fallback` when it is not supported.
    pub fn normalize_or(code: &str, fallback: Language) -> Language {
        Self::from_code(code).unwrap_or(fallback)
    }

    /// The registry's default language.
    pub fn default_language() -> Language {
        let config = LanguageRegistry::get().default_language();
        Language { code: config.code }
    }

    /// All enabled languages, in registry order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a value built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Key of the content resource holding this language's bundle.
    pub fn resource_key(&self) -> &'static str {
        self.config().resource_key
    }

    /// Locale tag for the document root.
    pub fn html_lang(&self) -> &'static str {
        self.config().html_lang
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::default_language()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
