use crate::coordinator::{HydrationSettings, DEFAULT_BRAND_IMAGE_SRC};
use crate::i18n::Language;
use crate::observer::ObserverSettings;
use crate::preference::DEFAULT_PREFERENCE_KEY;
use crate::render::RenderDefaults;
use crate::retry::RetryConfig;
use anyhow::{ensure, Context, Result};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Content
    /// Directory path or http(s) URL holding the per-language JSON files
    pub content_base: String,
    pub default_language: Language,

    // Session
    pub preference_key: String,
    pub session_file: String,

    // Page
    pub brand_image_src: String,
    pub reveal_threshold: f64,
    pub highlight_threshold: f64,

    // Fetching
    pub fetch_timeout_secs: u64,
    pub fetch_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(&code)
                .with_context(|| format!("DEFAULT_LANGUAGE '{}' is not supported", code))?,
            Err(_) => Language::default_language(),
        };

        let config = Self {
            // Content
            content_base: std::env::var("CONTENT_BASE")
                .unwrap_or_else(|_| "assets/data".to_string()),
            default_language,

            // Session
            preference_key: std::env::var("PREFERENCE_KEY")
                .unwrap_or_else(|_| DEFAULT_PREFERENCE_KEY.to_string()),
            session_file: std::env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".session.json".to_string()),

            // Page
            brand_image_src: std::env::var("BRAND_IMAGE_SRC")
                .unwrap_or_else(|_| DEFAULT_BRAND_IMAGE_SRC.to_string()),
            reveal_threshold: parse_var("REVEAL_THRESHOLD", 0.25)?,
            highlight_threshold: parse_var("HIGHLIGHT_THRESHOLD", 0.6)?,

            // Fetching
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS", 10)?,
            fetch_max_attempts: parse_var("FETCH_MAX_ATTEMPTS", 3)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("REVEAL_THRESHOLD", self.reveal_threshold),
            ("HIGHLIGHT_THRESHOLD", self.highlight_threshold),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "{} must be between 0 and 1, got {}",
                name,
                value
            );
        }
        ensure!(
            !self.preference_key.is_empty(),
            "PREFERENCE_KEY must not be empty"
        );
        ensure!(
            self.fetch_timeout_secs > 0,
            "FETCH_TIMEOUT_SECS must be at least 1"
        );
        Ok(())
    }

    /// Whether content is served over HTTP rather than read from disk.
    pub fn is_remote(&self) -> bool {
        self.content_base.starts_with("http://") || self.content_base.starts_with("https://")
    }

    pub fn hydration_settings(&self) -> HydrationSettings {
        HydrationSettings {
            fallback: self.default_language,
            brand_image_src: self.brand_image_src.clone(),
            observers: ObserverSettings {
                reveal_threshold: self.reveal_threshold,
                highlight_threshold: self.highlight_threshold,
            },
            render_defaults: RenderDefaults::default(),
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::content_fetch().with_max_attempts(self.fetch_max_attempts)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Parse an optional variable, falling back to `default` when it is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not valid: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
