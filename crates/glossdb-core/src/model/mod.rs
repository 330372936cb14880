//! Runtime data model definitions.
//!
//! Types in `model` describe entity shapes at runtime: which fields exist,
//! which relations can be followed, and which fields carry translatable text.
//! They are plain `'static` descriptors, usually emitted by
//! `translatable_entity!`, and are resolved once by the registry.
pub mod entity;
pub mod field;
pub mod relation;

pub use entity::{EntityModel, TranslatableFields};
pub use field::{FieldKind, FieldModel};
pub use relation::{Cardinality, RelationModel};
