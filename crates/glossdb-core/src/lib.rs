//! Core runtime for GlossDB: per-language text overlays for otherwise
//! language-neutral entities.
//!
//! Entities keep one base-language copy of every field. Translations live in
//! a side table keyed by `(entity_type, entity_id, field, language)`; the
//! engine reads that table in one batch per object graph, writes it back on
//! sync, and rewrites query predicates so filters run against translated text.
//!
//! Start from `db::TranslationSession`; declare entities with
//! `translatable_entity!`.

#[macro_use]
mod macros;

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod language;
pub mod model;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::predicate::{Predicate, field},
        language::Language,
        model::EntityModel,
        traits::{EntityKind, Translatable},
        value::Value,
    };
}
