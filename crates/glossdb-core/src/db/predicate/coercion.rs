use crate::value::{TextMode, Value};
use std::{cmp::Ordering, mem::discriminant};

///
/// Predicate comparison semantics
///
/// Defines which runtime value comparisons are permitted under an
/// explicit coercion policy. Helpers return `None` when a comparison is
/// undefined; evaluation treats that as a non-match.
///

///
/// CoercionId
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CoercionId {
    /// Same variant only; signed and unsigned integers compare numerically.
    #[default]
    Strict,
    /// Text compared after case folding.
    TextCasefold,
}

impl CoercionId {
    const fn text_mode(self) -> TextMode {
        match self {
            Self::Strict => TextMode::Cs,
            Self::TextCasefold => TextMode::Ci,
        }
    }
}

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

/// Equality under an explicit coercion.
#[must_use]
pub fn compare_eq(left: &Value, right: &Value, coercion: CoercionId) -> Option<bool> {
    match coercion {
        CoercionId::Strict => {
            if is_integer(left) && is_integer(right) {
                return left.partial_order(right).map(Ordering::is_eq);
            }

            same_variant(left, right).then_some(left == right)
        }
        CoercionId::TextCasefold => {
            let left = casefold_value(left)?;
            let right = casefold_value(right)?;
            Some(left == right)
        }
    }
}

/// Ordering under an explicit coercion.
#[must_use]
pub fn compare_order(left: &Value, right: &Value, coercion: CoercionId) -> Option<Ordering> {
    match coercion {
        CoercionId::Strict => left.partial_order(right),
        CoercionId::TextCasefold => {
            let left = casefold_value(left)?;
            let right = casefold_value(right)?;
            Some(left.cmp(&right))
        }
    }
}

/// Text-only comparison; `None` unless both sides are text.
#[must_use]
pub fn compare_text(left: &Value, right: &Value, coercion: CoercionId, op: TextOp) -> Option<bool> {
    let mode = coercion.text_mode();

    match op {
        TextOp::Contains => left.text_contains(right, mode),
        TextOp::StartsWith => left.text_starts_with(right, mode),
        TextOp::EndsWith => left.text_ends_with(right, mode),
    }
}

const fn is_integer(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Uint(_))
}

fn same_variant(left: &Value, right: &Value) -> bool {
    discriminant(left) == discriminant(right)
}

fn casefold_value(value: &Value) -> Option<String> {
    match value {
        Value::Text(text) if text.is_ascii() => Some(text.to_ascii_lowercase()),
        Value::Text(text) => Some(text.to_lowercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality_requires_same_family() {
        assert_eq!(
            compare_eq(&Value::from("1"), &Value::Int(1), CoercionId::Strict),
            None
        );
        assert_eq!(
            compare_eq(&Value::Int(1), &Value::Uint(1), CoercionId::Strict),
            Some(true)
        );
    }

    #[test]
    fn casefold_equality_ignores_case() {
        assert_eq!(
            compare_eq(
                &Value::from("Bonjour"),
                &Value::from("BONJOUR"),
                CoercionId::TextCasefold
            ),
            Some(true)
        );
        assert_eq!(
            compare_eq(&Value::Int(1), &Value::Int(1), CoercionId::TextCasefold),
            None
        );
    }

    #[test]
    fn text_ops_reject_non_text() {
        assert_eq!(
            compare_text(
                &Value::Int(1),
                &Value::from("1"),
                CoercionId::Strict,
                TextOp::StartsWith
            ),
            None
        );
    }
}
