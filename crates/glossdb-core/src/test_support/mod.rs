pub mod fixtures;

use crate::{
    db::{
        address::{Address, OverlayFilter, OverlayRecord},
        overlay::{MemoryOverlayStore, OverlayStore},
    },
    error::InternalError,
};
use std::cell::Cell;

///
/// CountingOverlayStore
///
/// Test-only `OverlayStore` that delegates to a `MemoryOverlayStore` and
/// counts round trips per operation.
///

#[derive(Default)]
pub struct CountingOverlayStore {
    pub inner: MemoryOverlayStore,
    pub fetches: Cell<usize>,
    pub gets: Cell<usize>,
    pub writes: Cell<usize>,
    pub purges: Cell<usize>,
}

impl CountingOverlayStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total store calls of any kind.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.fetches.get() + self.gets.get() + self.writes.get() + self.purges.get()
    }

    /// Seed one record directly into the inner store, bypassing the counters.
    pub fn seed(&self, address: Address, text: &str) {
        self.inner
            .upsert(address, text.to_string())
            .expect("seed write should succeed");
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl OverlayStore for CountingOverlayStore {
    fn fetch(&self, filter: &OverlayFilter) -> Result<Vec<OverlayRecord>, InternalError> {
        bump(&self.fetches);
        self.inner.fetch(filter)
    }

    fn get(&self, address: &Address) -> Result<Option<OverlayRecord>, InternalError> {
        bump(&self.gets);
        self.inner.get(address)
    }

    fn upsert(&self, address: Address, text: String) -> Result<(), InternalError> {
        bump(&self.writes);
        self.inner.upsert(address, text)
    }

    fn upsert_all(&self, records: Vec<OverlayRecord>) -> Result<(), InternalError> {
        bump(&self.writes);
        self.inner.upsert_all(records)
    }

    fn purge_entity(&self, entity_type: &str, entity_id: &str) -> Result<usize, InternalError> {
        bump(&self.purges);
        self.inner.purge_entity(entity_type, entity_id)
    }
}
