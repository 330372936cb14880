//! Language codes and the closed set of languages a deployment supports.

use crate::config::ConfigError;
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

///
/// Language
///
/// Lowercased language code (`fr`, `pt-br`). Construction only normalizes
/// case; membership in the configured set is checked by `Languages::resolve`.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary subtag (`pt` for `pt-br`).
    #[must_use]
    pub fn primary(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or_default()
    }

    /// Whether the code is a well-formed BCP 47-style tag.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut parts = self.0.split(['-', '_']);
        let Some(primary) = parts.next() else {
            return false;
        };
        if !(2..=8).contains(&primary.len()) || !primary.bytes().all(|b| b.is_ascii_alphabetic()) {
            return false;
        }

        parts.all(|part| (1..=8).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_alphanumeric()))
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

///
/// Languages
///
/// The fixed, closed enumeration of languages overlay rows may use,
/// plus the base language entity fields are authored in.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Languages {
    base: Language,
    supported: Vec<Language>,
}

impl Languages {
    pub fn new(base: &str, supported: &[&str]) -> Result<Self, ConfigError> {
        let base = Language::new(base);
        let mut languages: Vec<Language> = Vec::with_capacity(supported.len());

        if supported.is_empty() {
            return Err(ConfigError::NoLanguages);
        }

        for code in supported {
            let language = Language::new(code);
            if !language.is_well_formed() {
                return Err(ConfigError::InvalidLanguageCode {
                    code: (*code).to_string(),
                });
            }
            if languages.contains(&language) {
                return Err(ConfigError::DuplicateLanguage { code: language });
            }
            languages.push(language);
        }

        if !languages.contains(&base) {
            return Err(ConfigError::BaseLanguageNotSupported { code: base });
        }

        Ok(Self {
            base,
            supported: languages,
        })
    }

    #[must_use]
    pub const fn base(&self) -> &Language {
        &self.base
    }

    #[must_use]
    pub fn supported(&self) -> &[Language] {
        &self.supported
    }

    #[must_use]
    pub fn contains(&self, language: &Language) -> bool {
        self.supported.contains(language)
    }

    /// Map a caller-supplied code onto a configured language.
    ///
    /// Matching is case-insensitive; a regional code (`fr-ca`) falls back to
    /// its primary language (`fr`) when only the latter is configured.
    pub fn resolve(&self, code: &str) -> Result<Language, ConfigError> {
        let requested = Language::new(code);

        if self.contains(&requested) {
            return Ok(requested);
        }

        let primary = requested.primary();
        self.supported
            .iter()
            .find(|language| language.as_str() == primary)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownLanguage {
                code: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> Languages {
        Languages::new("en", &["en", "fr", "pt-br"]).expect("languages should build")
    }

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(languages().resolve("FR").unwrap(), Language::new("fr"));
        assert_eq!(languages().resolve("pt-BR").unwrap(), Language::new("pt-br"));
    }

    #[test]
    fn resolve_falls_back_to_primary_subtag() {
        assert_eq!(languages().resolve("fr-CA").unwrap(), Language::new("fr"));
    }

    #[test]
    fn resolve_rejects_unconfigured_language() {
        let err = languages().resolve("de").unwrap_err();

        assert!(matches!(err, ConfigError::UnknownLanguage { code } if code == "de"));
    }

    #[test]
    fn base_language_must_be_supported() {
        let err = Languages::new("en", &["fr"]).unwrap_err();

        assert!(matches!(err, ConfigError::BaseLanguageNotSupported { .. }));
    }

    #[test]
    fn malformed_and_duplicate_codes_are_rejected() {
        assert!(matches!(
            Languages::new("en", &["en", "e"]).unwrap_err(),
            ConfigError::InvalidLanguageCode { .. }
        ));
        assert!(matches!(
            Languages::new("en", &["en", "EN"]).unwrap_err(),
            ConfigError::DuplicateLanguage { .. }
        ));
    }
}
