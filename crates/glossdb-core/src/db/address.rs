use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    language::Language,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use thiserror::Error as ThisError;

///
/// AddressError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum AddressError {
    #[error("address key truncated while reading {component}")]
    Truncated { component: &'static str },

    #[error("address key component {component} is not valid utf-8")]
    InvalidUtf8 { component: &'static str },

    #[error("address key component {component} is empty")]
    EmptyComponent { component: &'static str },

    #[error("address key has {len} trailing bytes")]
    TrailingBytes { len: usize },

    #[error("address component {component} must not be empty")]
    Blank { component: &'static str },

    #[error("address component {component} is {len} bytes, too long to encode")]
    ComponentTooLong { component: &'static str, len: usize },
}

impl AddressError {
    /// Encode-side errors are caller mistakes; decode-side errors mean the
    /// stored key is damaged.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Blank { .. } | Self::ComponentTooLong { .. } => ErrorClass::Configuration,
            Self::Truncated { .. }
            | Self::InvalidUtf8 { .. }
            | Self::EmptyComponent { .. }
            | Self::TrailingBytes { .. } => ErrorClass::Corruption,
        }
    }
}

impl From<AddressError> for InternalError {
    fn from(err: AddressError) -> Self {
        Self::new(err.class(), ErrorOrigin::Address, err.to_string())
    }
}

///
/// EntityRef
///
/// Polymorphic reference to one entity instance: a type tag plus the
/// instance identity rendered as a string.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub entity_id: String,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type, self.entity_id)
    }
}

///
/// Address
///
/// Unique key of one translation slot:
/// `(entity_type, entity_id, field, language)`.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Address {
    pub entity_type: String,
    pub entity_id: String,
    pub field: String,
    pub language: Language,
}

impl Address {
    const COMPONENTS: [&'static str; 4] = ["entity_type", "entity_id", "field", "language"];

    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        field: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            field: field.into(),
            language,
        }
    }

    #[must_use]
    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.entity_type.clone(), self.entity_id.clone())
    }

    fn components(&self) -> [&str; 4] {
        [
            self.entity_type.as_str(),
            self.entity_id.as_str(),
            self.field.as_str(),
            self.language.as_str(),
        ]
    }

    /// Check that every component can be encoded and decoded again.
    /// `to_key_bytes` and `from_key_bytes` apply the same rule.
    pub fn validate(&self) -> Result<(), AddressError> {
        for (component, part) in Self::COMPONENTS.into_iter().zip(self.components()) {
            if part.is_empty() {
                return Err(AddressError::Blank { component });
            }
            if u32::try_from(part.len()).is_err() {
                return Err(AddressError::ComponentTooLong {
                    component,
                    len: part.len(),
                });
            }
        }

        Ok(())
    }

    /// Encode the storage key: four components, each a big-endian `u32`
    /// length followed by its utf-8 bytes. Order matches the uniqueness
    /// constraint, so keys sort by entity first.
    pub fn to_key_bytes(&self) -> Result<Vec<u8>, AddressError> {
        self.validate()?;

        let parts = self.components();
        let len = parts.iter().map(|part| 4 + part.len()).sum();
        let mut out = Vec::with_capacity(len);

        for (component, part) in Self::COMPONENTS.into_iter().zip(parts) {
            let part_len = u32::try_from(part.len()).map_err(|_| AddressError::ComponentTooLong {
                component,
                len: part.len(),
            })?;
            out.extend_from_slice(&part_len.to_be_bytes());
            out.extend_from_slice(part.as_bytes());
        }

        Ok(out)
    }

    /// Decode a storage key produced by `to_key_bytes`.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let mut cursor = bytes;
        let mut parts: Vec<String> = Vec::with_capacity(Self::COMPONENTS.len());

        for component in Self::COMPONENTS {
            let (len_bytes, rest) = cursor
                .split_first_chunk::<4>()
                .ok_or(AddressError::Truncated { component })?;
            let len = u32::from_be_bytes(*len_bytes) as usize;
            if rest.len() < len {
                return Err(AddressError::Truncated { component });
            }

            let (raw, rest) = rest.split_at(len);
            let text = std::str::from_utf8(raw)
                .map_err(|_| AddressError::InvalidUtf8 { component })?;
            if text.is_empty() {
                return Err(AddressError::EmptyComponent { component });
            }

            parts.push(text.to_string());
            cursor = rest;
        }

        if !cursor.is_empty() {
            return Err(AddressError::TrailingBytes { len: cursor.len() });
        }

        let [entity_type, entity_id, field, language]: [String; 4] = parts
            .try_into()
            .map_err(|_| AddressError::Truncated { component: "language" })?;

        Ok(Self {
            entity_type,
            entity_id,
            field,
            language: Language::new(&language),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}.{}[{}]",
            self.entity_type, self.entity_id, self.field, self.language
        )
    }
}

///
/// OverlayRecord
/// One stored translation.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OverlayRecord {
    pub address: Address,
    pub text: String,
}

impl OverlayRecord {
    #[must_use]
    pub const fn new(address: Address, text: String) -> Self {
        Self { address, text }
    }
}

impl fmt::Display for OverlayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.address, self.text)
    }
}

///
/// OverlayFilter
///
/// Compound read filter: any of these `(type, id)` pairs, for any of
/// these languages. This is the only read shape the engine issues.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OverlayFilter {
    pub entities: BTreeSet<EntityRef>,
    pub languages: BTreeSet<Language>,
}

impl OverlayFilter {
    #[must_use]
    pub fn new(entities: BTreeSet<EntityRef>, language: Language) -> Self {
        Self {
            entities,
            languages: BTreeSet::from([language]),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() || self.languages.is_empty()
    }

    #[must_use]
    pub fn matches(&self, address: &Address) -> bool {
        self.languages.contains(&address.language)
            && self.entities.iter().any(|entity| {
                entity.entity_type == address.entity_type && entity.entity_id == address.entity_id
            })
    }
}
