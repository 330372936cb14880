//! GlossDB: per-language text overlays for language-neutral entities.
//!
//! ## Crate layout
//! - `core`: the overlay engine (registry, walker, contexts, predicates,
//!   queries, session, metrics, config).
//! - `error`: the public error taxonomy every fallible call maps onto.
//!
//! The `prelude` module carries the vocabulary most callers need to
//! declare entities, build filters and run translated loads.

pub use glossdb_core as core;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin, StoreErrorKind};

/// re-exports
///
/// `translatable_entity!` expands to `$crate` paths inside glossdb-core;
/// re-exporting it here lets callers depend on this crate alone.
pub use glossdb_core::translatable_entity;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result alias over the public error type.
pub type Result<T> = std::result::Result<T, Error>;

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::OverlayConfig,
        db::{
            EntityStore, MemoryEntityStore, MemoryOverlayStore, OverlayStore, Registry,
            TranslatedQuery, TranslationSession,
            predicate::{Predicate, field},
        },
        language::Language,
        traits::{EntityKind as _, Translatable as _},
        value::Value,
    };
    pub use crate::{Error, ErrorKind};
}
