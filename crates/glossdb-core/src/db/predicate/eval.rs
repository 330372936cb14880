use crate::{
    db::{
        address::{Address, OverlayRecord},
        overlay::OverlayStore,
        predicate::{
            CompareOp, ComparePredicate, OVERLAY_TEXT_FIELD, OverlayPredicate, Predicate,
            coercion::{CoercionId, TextOp, compare_eq, compare_order, compare_text},
        },
    },
    error::InternalError,
    traits::Translatable,
    value::{TextMode, Value},
};
use std::cmp::Ordering;

///
/// FieldPresence
///
/// Distinguishes a missing field from a present field whose value may be
/// `Value::Null`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldPresence {
    Present(Value),
    Missing,
}

///
/// Row
///
/// Anything a predicate can be evaluated against.
/// `identity` is required to resolve `Predicate::Overlay` nodes; rows
/// without one never match them.
///

pub trait Row {
    fn field(&self, name: &str) -> FieldPresence;

    fn identity(&self) -> Option<String> {
        None
    }
}

impl Row for dyn Translatable + '_ {
    fn field(&self, name: &str) -> FieldPresence {
        match self.get_value(name) {
            Some(value) => FieldPresence::Present(value),
            None => FieldPresence::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(Translatable::identity(self))
    }
}

impl Row for OverlayRecord {
    fn field(&self, name: &str) -> FieldPresence {
        if name == OVERLAY_TEXT_FIELD {
            FieldPresence::Present(Value::Text(self.text.clone()))
        } else {
            FieldPresence::Missing
        }
    }
}

// Evaluate a field predicate only when the field is present.
fn on_present<R: Row + ?Sized>(row: &R, field: &str, f: impl FnOnce(&Value) -> bool) -> bool {
    match row.field(field) {
        FieldPresence::Present(value) => f(&value),
        FieldPresence::Missing => false,
    }
}

///
/// Evaluate a predicate against a single row.
///
/// Native leaves never touch the store. `Overlay` leaves issue one point
/// lookup each; a missing overlay record is a non-match, never a fall back
/// to the base value. Undefined comparisons evaluate to `false`.
///
pub fn eval<R: Row + ?Sized>(
    row: &R,
    predicate: &Predicate,
    overlay: &dyn OverlayStore,
) -> Result<bool, InternalError> {
    let matched = match predicate {
        Predicate::True => true,
        Predicate::False => false,

        Predicate::And(children) => {
            for child in children {
                if !eval(row, child, overlay)? {
                    return Ok(false);
                }
            }
            true
        }
        Predicate::Or(children) => {
            for child in children {
                if eval(row, child, overlay)? {
                    return Ok(true);
                }
            }
            false
        }
        Predicate::Not(inner) => !eval(row, inner, overlay)?,

        Predicate::Compare(cmp) => eval_compare(row, cmp),

        Predicate::IsNull { field } => {
            matches!(row.field(field), FieldPresence::Present(Value::Null))
        }
        Predicate::IsMissing { field } => matches!(row.field(field), FieldPresence::Missing),
        Predicate::IsEmpty { field } => on_present(row, field, is_empty_value),
        Predicate::IsNotEmpty { field } => on_present(row, field, |value| !is_empty_value(value)),

        Predicate::TextContains { field, value } => on_present(row, field, |actual| {
            actual.text_contains(value, TextMode::Cs).unwrap_or(false)
        }),
        Predicate::TextContainsCi { field, value } => on_present(row, field, |actual| {
            actual.text_contains(value, TextMode::Ci).unwrap_or(false)
        }),

        Predicate::Overlay(node) => eval_overlay(row, node, overlay)?,
    };

    Ok(matched)
}

fn eval_overlay<R: Row + ?Sized>(
    row: &R,
    node: &OverlayPredicate,
    overlay: &dyn OverlayStore,
) -> Result<bool, InternalError> {
    let Some(identity) = row.identity() else {
        return Ok(false);
    };

    let address = Address::new(
        node.entity_type.clone(),
        identity,
        node.field.clone(),
        node.language.clone(),
    );

    match overlay.get(&address)? {
        Some(record) => eval(&record, &node.condition, overlay),
        None => Ok(false),
    }
}

fn eval_compare<R: Row + ?Sized>(row: &R, cmp: &ComparePredicate) -> bool {
    let ComparePredicate {
        field,
        op,
        value,
        coercion,
    } = cmp;

    let FieldPresence::Present(actual) = row.field(field) else {
        return false;
    };
    let coercion = *coercion;

    match op {
        CompareOp::Eq => compare_eq(&actual, value, coercion).unwrap_or(false),
        CompareOp::Ne => compare_eq(&actual, value, coercion).is_some_and(|v| !v),

        CompareOp::Lt => compare_order(&actual, value, coercion).is_some_and(Ordering::is_lt),
        CompareOp::Lte => compare_order(&actual, value, coercion).is_some_and(Ordering::is_le),
        CompareOp::Gt => compare_order(&actual, value, coercion).is_some_and(Ordering::is_gt),
        CompareOp::Gte => compare_order(&actual, value, coercion).is_some_and(Ordering::is_ge),

        CompareOp::In => in_list(&actual, value, coercion).unwrap_or(false),
        CompareOp::NotIn => in_list(&actual, value, coercion).is_some_and(|matched| !matched),

        CompareOp::Contains => contains(&actual, value, coercion),
        CompareOp::StartsWith => {
            compare_text(&actual, value, coercion, TextOp::StartsWith).unwrap_or(false)
        }
        CompareOp::EndsWith => {
            compare_text(&actual, value, coercion, TextOp::EndsWith).unwrap_or(false)
        }
    }
}

const fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Text(text) => text.is_empty(),
        Value::List(items) => items.is_empty(),
        _ => false,
    }
}

fn in_list(actual: &Value, list: &Value, coercion: CoercionId) -> Option<bool> {
    let Value::List(items) = list else {
        return None;
    };

    let mut saw_valid = false;
    for item in items {
        match compare_eq(actual, item, coercion) {
            Some(true) => return Some(true),
            Some(false) => saw_valid = true,
            None => {}
        }
    }

    saw_valid.then_some(false)
}

// Text haystacks use substring matching; lists use element membership.
fn contains(actual: &Value, needle: &Value, coercion: CoercionId) -> bool {
    match actual {
        Value::Text(_) => compare_text(actual, needle, coercion, TextOp::Contains).unwrap_or(false),
        Value::List(items) => items
            .iter()
            .any(|item| compare_eq(item, needle, coercion).unwrap_or(false)),
        _ => false,
    }
}
