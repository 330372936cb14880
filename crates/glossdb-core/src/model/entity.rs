use crate::model::{field::FieldModel, relation::RelationModel};

///
/// EntityModel
/// Minimal, macro-generated runtime model for one entity type.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable type tag stored in overlay addresses; must never change once
    /// overlay rows reference it.
    pub type_tag: &'static str,
    /// Identity field (points at an entry in `fields`).
    pub primary_key: &'static str,
    /// Ordered field list.
    pub fields: &'static [FieldModel],
    /// Relations that may appear as relation-path segments.
    pub relations: &'static [RelationModel],
    pub translatable: TranslatableFields,
}

impl EntityModel {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&'static RelationModel> {
        self.relations.iter().find(|relation| relation.name == name)
    }
}

///
/// TranslatableFields
///
/// Field-set declaration for one entity type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranslatableFields {
    /// Every free-text field, in declaration order.
    Auto,
    /// No field is translatable.
    None,
    /// Exactly these fields, in this order.
    Explicit(&'static [&'static str]),
}
