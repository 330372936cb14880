use crate::{
    db::{
        address::{OverlayFilter, OverlayRecord},
        overlay::OverlayStore,
    },
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};

///
/// OverlayAccessor
///
/// Thin gateway between the engine and an `OverlayStore`.
/// Every engine read and write goes through here so round trips are
/// counted in one place.
///

#[derive(Clone, Copy)]
pub(crate) struct OverlayAccessor<'a> {
    store: &'a dyn OverlayStore,
    debug: bool,
}

impl<'a> OverlayAccessor<'a> {
    pub(crate) const fn new(store: &'a dyn OverlayStore, debug: bool) -> Self {
        Self { store, debug }
    }

    /// Issue one batched read. An empty filter is answered locally.
    pub(crate) fn fetch(&self, filter: &OverlayFilter) -> Result<Vec<OverlayRecord>, InternalError> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.store.fetch(filter)?;

        sink::record(MetricsEvent::OverlayFetch {
            pairs: filter.entities.len() as u64,
            records: records.len() as u64,
        });
        if self.debug {
            tracing::debug!(
                pairs = filter.entities.len(),
                languages = filter.languages.len(),
                records = records.len(),
                "overlay fetch"
            );
        }

        Ok(records)
    }

    /// Write a validated batch of records.
    pub(crate) fn write(&self, records: Vec<OverlayRecord>) -> Result<(), InternalError> {
        if records.is_empty() {
            return Ok(());
        }

        let count = records.len() as u64;
        self.store.upsert_all(records)?;

        sink::record(MetricsEvent::OverlayWrite { records: count });
        if self.debug {
            tracing::debug!(records = count, "overlay write");
        }

        Ok(())
    }

    pub(crate) fn purge(
        &self,
        entity_type: &'static str,
        entity_id: &str,
    ) -> Result<usize, InternalError> {
        let removed = self.store.purge_entity(entity_type, entity_id)?;

        sink::record(MetricsEvent::OverlayPurge { entity_type });
        if self.debug {
            tracing::debug!(entity_type, entity_id, removed, "overlay purge");
        }

        Ok(removed)
    }
}
