//! Overlay store boundary: the side table of translations keyed by `Address`.

mod accessor;
mod memory;

pub(crate) use accessor::OverlayAccessor;
pub use memory::MemoryOverlayStore;

use crate::{
    db::address::{Address, OverlayFilter, OverlayRecord},
    error::InternalError,
};

///
/// OverlayStore
///
/// Collaborator contract for the translation side table.
///
/// Implementations must enforce uniqueness of the full `Address`, make
/// `upsert` atomic (last writer wins), and cascade `purge_entity` when the
/// owning entity is deleted. Failures surface as store-class
/// `InternalError`s; the engine never retries.
///

pub trait OverlayStore {
    /// Return every record matching the compound filter, in one read.
    fn fetch(&self, filter: &OverlayFilter) -> Result<Vec<OverlayRecord>, InternalError>;

    /// Point lookup of one address.
    fn get(&self, address: &Address) -> Result<Option<OverlayRecord>, InternalError>;

    /// Create or replace the record at `address`.
    fn upsert(&self, address: Address, text: String) -> Result<(), InternalError>;

    /// Write several records. The default issues one `upsert` per record;
    /// stores that can commit a batch atomically should override it.
    fn upsert_all(&self, records: Vec<OverlayRecord>) -> Result<(), InternalError> {
        for record in records {
            self.upsert(record.address, record.text)?;
        }

        Ok(())
    }

    /// Remove every record owned by one entity; returns how many were removed.
    fn purge_entity(&self, entity_type: &str, entity_id: &str) -> Result<usize, InternalError>;
}
