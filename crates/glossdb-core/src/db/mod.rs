//! Overlay engine runtime: addressing, registry, overlay and entity store
//! boundaries, graph walking, translation contexts, predicates, queries and
//! the session that ties them together.

pub mod address;
pub mod context;
pub mod overlay;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod session;
pub mod store;
pub mod walker;

// re-exports
pub use address::{Address, AddressError, EntityRef, OverlayFilter, OverlayRecord};
pub use context::{ApplyStats, TranslationContext};
pub use overlay::{MemoryOverlayStore, OverlayStore};
pub use query::{
    QueryError, QueryPlan, Response, Rows, Shape, TranslatedQuery, TranslationMode, ValueRow,
};
pub use registry::{RegisteredEntity, Registry, RegistryError};
pub use session::TranslationSession;
pub use store::{EntityStore, MemoryEntityStore};
pub use walker::{GraphWalker, RelationTree};
