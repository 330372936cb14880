//! Overlay engine configuration.
//!
//! Loaded from TOML by the embedding application and passed explicitly to a
//! `TranslationSession`; the engine keeps no process-wide configuration.
//!
//! ```toml
//! base_language = "en"
//! languages = ["en", "fr", "de"]
//! sync_empty = true
//! ```

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    language::{Language, Languages},
};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid overlay config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("at least one language must be configured")]
    NoLanguages,

    #[error("invalid language code '{code}'")]
    InvalidLanguageCode { code: String },

    #[error("language '{code}' is configured more than once")]
    DuplicateLanguage { code: Language },

    #[error("base language '{code}' is not in the configured language set")]
    BaseLanguageNotSupported { code: Language },

    #[error("language '{code}' is not configured")]
    UnknownLanguage { code: String },
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Config, err.to_string())
    }
}

///
/// OverlayConfigFile
/// Raw TOML shape before validation.
///

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverlayConfigFile {
    base_language: String,
    languages: Vec<String>,
    #[serde(default = "default_sync_empty")]
    sync_empty: bool,
}

const fn default_sync_empty() -> bool {
    true
}

///
/// OverlayConfig
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverlayConfig {
    languages: Languages,
    sync_empty: bool,
}

impl OverlayConfig {
    pub fn new(base_language: &str, languages: &[&str]) -> Result<Self, ConfigError> {
        Ok(Self {
            languages: Languages::new(base_language, languages)?,
            sync_empty: default_sync_empty(),
        })
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: OverlayConfigFile = toml::from_str(source)?;
        let languages: Vec<&str> = file.languages.iter().map(String::as_str).collect();

        Ok(Self {
            languages: Languages::new(&file.base_language, &languages)?,
            sync_empty: file.sync_empty,
        })
    }

    /// Whether sync writes empty strings as translations.
    /// An empty translation is a value, not an absence.
    #[must_use]
    pub const fn with_sync_empty(mut self, sync_empty: bool) -> Self {
        self.sync_empty = sync_empty;
        self
    }

    #[must_use]
    pub const fn languages(&self) -> &Languages {
        &self.languages
    }

    #[must_use]
    pub const fn sync_empty(&self) -> bool {
        self.sync_empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_config_loads_with_defaults() {
        let config = OverlayConfig::from_toml_str(
            r#"
            base_language = "en"
            languages = ["en", "fr", "de"]
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.languages().base(), &Language::new("en"));
        assert_eq!(config.languages().supported().len(), 3);
        assert!(config.sync_empty());
    }

    #[test]
    fn toml_config_honors_sync_empty() {
        let config = OverlayConfig::from_toml_str(
            r#"
            base_language = "en"
            languages = ["en"]
            sync_empty = false
            "#,
        )
        .expect("config should parse");

        assert!(!config.sync_empty());
    }

    #[test]
    fn toml_config_rejects_unknown_keys() {
        let err = OverlayConfig::from_toml_str(
            r#"
            base_language = "en"
            languages = ["en"]
            current_language = "fr"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn config_errors_classify_as_configuration() {
        let err: InternalError = OverlayConfig::new("en", &[]).unwrap_err().into();

        assert!(err.is_configuration());
        assert_eq!(err.origin, ErrorOrigin::Config);
    }
}
