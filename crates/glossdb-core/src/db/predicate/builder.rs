use crate::{
    db::predicate::{CoercionId, CompareOp, ComparePredicate, Predicate},
    traits::FieldValue,
    value::Value,
};

///
/// FieldRef
///
/// Zero-cost wrapper around a static field name used in predicates.
/// Enables method-based predicate builders without allocating.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FieldRef(&'static str);

impl FieldRef {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    // ------------------------------------------------------------------
    // Comparison predicates
    // ------------------------------------------------------------------

    #[must_use]
    pub fn eq(self, value: impl FieldValue) -> Predicate {
        compare(self.0, CompareOp::Eq, value.to_value(), CoercionId::Strict)
    }

    /// Case-insensitive text equality.
    #[must_use]
    pub fn eq_ci(self, value: impl FieldValue) -> Predicate {
        compare(
            self.0,
            CompareOp::Eq,
            value.to_value(),
            CoercionId::TextCasefold,
        )
    }

    #[must_use]
    pub fn ne(self, value: impl FieldValue) -> Predicate {
        compare(self.0, CompareOp::Ne, value.to_value(), CoercionId::Strict)
    }

    #[must_use]
    pub fn lt(self, value: impl FieldValue) -> Predicate {
        compare(self.0, CompareOp::Lt, value.to_value(), CoercionId::Strict)
    }

    #[must_use]
    pub fn lte(self, value: impl FieldValue) -> Predicate {
        compare(self.0, CompareOp::Lte, value.to_value(), CoercionId::Strict)
    }

    #[must_use]
    pub fn gt(self, value: impl FieldValue) -> Predicate {
        compare(self.0, CompareOp::Gt, value.to_value(), CoercionId::Strict)
    }

    #[must_use]
    pub fn gte(self, value: impl FieldValue) -> Predicate {
        compare(self.0, CompareOp::Gte, value.to_value(), CoercionId::Strict)
    }

    /// Membership test against a fixed list.
    #[must_use]
    pub fn in_list<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        compare(self.0, CompareOp::In, list(values), CoercionId::Strict)
    }

    #[must_use]
    pub fn not_in_list<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: FieldValue,
    {
        compare(self.0, CompareOp::NotIn, list(values), CoercionId::Strict)
    }

    // ------------------------------------------------------------------
    // Text predicates
    // ------------------------------------------------------------------

    /// Case-sensitive substring match.
    #[must_use]
    pub fn text_contains(self, value: impl FieldValue) -> Predicate {
        Predicate::TextContains {
            field: self.0.to_string(),
            value: value.to_value(),
        }
    }

    /// Case-insensitive substring match.
    #[must_use]
    pub fn text_contains_ci(self, value: impl FieldValue) -> Predicate {
        Predicate::TextContainsCi {
            field: self.0.to_string(),
            value: value.to_value(),
        }
    }

    #[must_use]
    pub fn starts_with(self, value: impl FieldValue) -> Predicate {
        compare(
            self.0,
            CompareOp::StartsWith,
            value.to_value(),
            CoercionId::Strict,
        )
    }

    #[must_use]
    pub fn starts_with_ci(self, value: impl FieldValue) -> Predicate {
        compare(
            self.0,
            CompareOp::StartsWith,
            value.to_value(),
            CoercionId::TextCasefold,
        )
    }

    #[must_use]
    pub fn ends_with(self, value: impl FieldValue) -> Predicate {
        compare(
            self.0,
            CompareOp::EndsWith,
            value.to_value(),
            CoercionId::Strict,
        )
    }

    // ------------------------------------------------------------------
    // Structural predicates
    // ------------------------------------------------------------------

    /// Field is present and explicitly null.
    #[must_use]
    pub fn is_null(self) -> Predicate {
        Predicate::IsNull {
            field: self.0.to_string(),
        }
    }

    /// Field is not present at all.
    #[must_use]
    pub fn is_missing(self) -> Predicate {
        Predicate::IsMissing {
            field: self.0.to_string(),
        }
    }

    #[must_use]
    pub fn is_empty(self) -> Predicate {
        Predicate::IsEmpty {
            field: self.0.to_string(),
        }
    }

    #[must_use]
    pub fn is_not_empty(self) -> Predicate {
        Predicate::IsNotEmpty {
            field: self.0.to_string(),
        }
    }
}

impl AsRef<str> for FieldRef {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Shorthand for `FieldRef::new`.
#[must_use]
pub const fn field(name: &'static str) -> FieldRef {
    FieldRef::new(name)
}

fn compare(field: &str, op: CompareOp, value: Value, coercion: CoercionId) -> Predicate {
    Predicate::Compare(ComparePredicate::with_coercion(field, op, value, coercion))
}

fn list<I, V>(values: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: FieldValue,
{
    Value::List(values.into_iter().map(|value| value.to_value()).collect())
}
