//! Error types for content loading and session storage.
//!
//! Content errors are caught at the coordinator boundary and never reach the
//! user as distinct messages; they exist so logs and tests can tell the
//! failure modes apart.

use thiserror::Error;

/// Failure while resolving a language or loading its content bundle.
#[derive(Error, Debug)]
pub enum ContentError {
    /// Requested code is not in the language registry (or is disabled)
    #[error("Unsupported language: '{code}'")]
    UnsupportedLanguage { code: String },

    /// The content source answered with a non-success status
    #[error("Failed to load content for {lang}: {status}")]
    FetchFailed { lang: String, status: u16 },

    /// The payload was not a valid content bundle
    #[error("Failed to parse content for {lang}")]
    ParseFailed {
        lang: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced a status (DNS, connect, timeout, I/O)
    #[error("Transport error while loading content for {lang}: {message}")]
    Transport { lang: String, message: String },
}

/// Failure reading or writing the session store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not access session file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file {path} is not valid JSON")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
