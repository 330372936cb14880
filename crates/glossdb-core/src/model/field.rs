use std::fmt::{self, Display};

///
/// FieldModel
/// Runtime field metadata used by registration and predicate rewriting.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used in predicates and overlay addresses.
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

///
/// FieldKind
///
/// Minimal type surface needed to decide translatability.
/// This is a lossy projection of whatever the entity store persists.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// Short free text.
    Text,
    /// Long-form free text.
    LongText,
    /// Text-shaped, but an address rather than prose.
    Email,
    /// Text restricted to a closed set of values.
    Choice(&'static [&'static str]),
    Bool,
    Int,
    Uint,
    Timestamp,

    /// Marker for fields the engine never inspects.
    Unsupported,
}

impl FieldKind {
    /// Free text that `TranslatableFields::Auto` picks up.
    #[must_use]
    pub const fn is_free_text(&self) -> bool {
        matches!(self, Self::Text | Self::LongText)
    }

    /// Text that may be listed explicitly as translatable.
    /// Choice values are never translatable: they are keys, not prose.
    #[must_use]
    pub const fn accepts_translation(&self) -> bool {
        matches!(self, Self::Text | Self::LongText | Self::Email)
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Email => "email",
            Self::Choice(_) => "choice",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Timestamp => "timestamp",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}
