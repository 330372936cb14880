use crate::{db::predicate::coercion::CoercionId, language::Language, value::Value};
use std::ops::{BitAnd, BitOr};

///
/// Predicate AST
///
/// Pure representation of filter predicates. Field names are resolved
/// against the entity model by the rewriter; evaluation happens in
/// `eval` against a row plus the overlay store.
///

/// Field name an overlay record exposes to a rewritten condition.
pub const OVERLAY_TEXT_FIELD: &str = "text";

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
    pub coercion: CoercionId,
}

impl ComparePredicate {
    fn new(field: String, op: CompareOp, value: Value) -> Self {
        Self {
            field,
            op,
            value,
            coercion: CoercionId::Strict,
        }
    }

    /// Construct a comparison predicate with an explicit coercion policy.
    #[must_use]
    pub fn with_coercion(
        field: impl Into<String>,
        op: CompareOp,
        value: Value,
        coercion: CoercionId,
    ) -> Self {
        Self {
            field: field.into(),
            op,
            value,
            coercion,
        }
    }

    #[must_use]
    pub fn eq(field: String, value: Value) -> Self {
        Self::new(field, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(field: String, value: Value) -> Self {
        Self::new(field, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(field: String, value: Value) -> Self {
        Self::new(field, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn gt(field: String, value: Value) -> Self {
        Self::new(field, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn in_(field: String, values: Vec<Value>) -> Self {
        Self::new(field, CompareOp::In, Value::List(values))
    }
}

///
/// OverlayPredicate
///
/// "There is an overlay record for this row's `(entity_type, identity)`,
/// this field and this language, and its text satisfies `condition`."
/// `condition` addresses the record through `OVERLAY_TEXT_FIELD`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverlayPredicate {
    pub entity_type: String,
    pub field: String,
    pub language: Language,
    pub condition: Box<Predicate>,
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    IsNull { field: String },
    IsMissing { field: String },
    IsEmpty { field: String },
    IsNotEmpty { field: String },
    TextContains { field: String, value: Value },
    TextContainsCi { field: String, value: Value },
    Overlay(OverlayPredicate),
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn eq(field: String, value: Value) -> Self {
        Self::Compare(ComparePredicate::eq(field, value))
    }

    #[must_use]
    pub fn ne(field: String, value: Value) -> Self {
        Self::Compare(ComparePredicate::ne(field, value))
    }

    #[must_use]
    pub fn in_(field: String, values: Vec<Value>) -> Self {
        Self::Compare(ComparePredicate::in_(field, values))
    }

    /// Field name of a leaf predicate; `None` for composite and constant nodes.
    #[must_use]
    pub fn leaf_field(&self) -> Option<&str> {
        match self {
            Self::Compare(cmp) => Some(&cmp.field),
            Self::IsNull { field }
            | Self::IsMissing { field }
            | Self::IsEmpty { field }
            | Self::IsNotEmpty { field }
            | Self::TextContains { field, .. }
            | Self::TextContainsCi { field, .. } => Some(field),
            Self::Overlay(overlay) => Some(&overlay.field),
            Self::True | Self::False | Self::And(_) | Self::Or(_) | Self::Not(_) => None,
        }
    }

    /// Same leaf, reading `field` instead of its current field.
    /// Composite nodes are returned unchanged.
    #[must_use]
    pub fn with_leaf_field(&self, field: &str) -> Self {
        let field = field.to_string();

        match self {
            Self::Compare(cmp) => Self::Compare(ComparePredicate {
                field,
                ..cmp.clone()
            }),
            Self::IsNull { .. } => Self::IsNull { field },
            Self::IsMissing { .. } => Self::IsMissing { field },
            Self::IsEmpty { .. } => Self::IsEmpty { field },
            Self::IsNotEmpty { .. } => Self::IsNotEmpty { field },
            Self::TextContains { value, .. } => Self::TextContains {
                field,
                value: value.clone(),
            },
            Self::TextContainsCi { value, .. } => Self::TextContainsCi {
                field,
                value: value.clone(),
            },
            Self::Overlay(overlay) => Self::Overlay(OverlayPredicate {
                field,
                ..overlay.clone()
            }),
            other => other.clone(),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self.clone(), rhs.clone()])
    }
}
