//! Internationalization (i18n) module.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported languages, their
//!   content resources and document locale tags
//! - `language`: Validated `Language` type built only from registry entries
//!
//! # Example
//!
//! ```rust,ignore
//! use content_hydrator::i18n::Language;
//!
//! let japanese = Language::from_code("ja")?;
//! assert_eq!(japanese.resource_key(), "content.ja.json");
//!
//! // Unknown codes collapse to a fallback instead of failing
//! let lang = Language::normalize_or("fr", Language::default_language());
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
