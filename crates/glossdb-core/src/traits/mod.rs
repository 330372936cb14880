mod field;
mod relation;

pub use field::FieldValue;
pub use relation::{RelatedMut, RelationTarget};

use crate::{model::EntityModel, value::Value};

// ============================================================================
// ENTITY SCHEMA
// ============================================================================
//
// These traits describe *what an entity is*.
//

///
/// EntityKind
///
/// Declared schema facts for an entity type.
///

pub trait EntityKind {
    const MODEL: &'static EntityModel;
}

// ============================================================================
// ENTITY VALUES
// ============================================================================
//
// These traits describe *instances* of entities.
//

///
/// FieldValues
///
/// Read access to an instance's fields by name, used by predicate evaluation.
///

pub trait FieldValues {
    fn get_value(&self, field: &str) -> Option<Value>;
}

///
/// Translatable
///
/// The capability an entity exposes to the overlay engine.
///
/// `identity` is coerced to a string because overlay rows address every
/// entity type through the same polymorphic `(type_tag, identity)` pair.
/// The trait is object safe; graph walks operate on `dyn Translatable`.
///

pub trait Translatable: FieldValues {
    fn model(&self) -> &'static EntityModel;

    fn type_tag(&self) -> &'static str {
        self.model().type_tag
    }

    fn identity(&self) -> String;

    /// Current text of a field, or `None` for null / non-text fields.
    fn text(&self, field: &str) -> Option<&str>;

    /// Whether `set_text` would accept text for `field`.
    fn accepts_text(&self, field: &str) -> bool;

    /// Overwrite a text field in memory. Returns `false` if the field
    /// does not exist or does not hold text.
    fn set_text(&mut self, field: &str, text: String) -> bool;

    /// Call `f` once per instance reachable through `relation`.
    /// Returns `false` if the relation is not known to this instance.
    fn visit_related(&self, relation: &str, f: &mut dyn FnMut(&dyn Translatable)) -> bool;

    /// Mutable twin of `visit_related`. Shared targets that cannot be
    /// borrowed right now are reported as `RelatedMut::Busy`.
    fn visit_related_mut(&mut self, relation: &str, f: &mut dyn FnMut(RelatedMut<'_>)) -> bool;
}
