//! Entity store boundary: where the language-neutral entities live.

mod memory;

pub use memory::MemoryEntityStore;

use crate::{db::predicate::Predicate, error::InternalError};

///
/// EntityStore
///
/// Collaborator contract for base-entity persistence.
///
/// `query` must honor `Predicate::Overlay` nodes by consulting the overlay
/// table for the row's `(type, identity)`; rows without a matching
/// overlay record do not satisfy such a node.
///

pub trait EntityStore<E> {
    /// Load one entity by its string identity.
    fn load(&self, id: &str) -> Result<Option<E>, InternalError>;

    /// Every entity satisfying `predicate`, in identity order.
    fn query(&self, predicate: &Predicate) -> Result<Vec<E>, InternalError>;
}
