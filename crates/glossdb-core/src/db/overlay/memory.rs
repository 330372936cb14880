use crate::{
    db::{
        address::{Address, AddressError, OverlayFilter, OverlayRecord},
        overlay::OverlayStore,
    },
    error::InternalError,
};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

///
/// MemoryOverlayStore
///
/// Reference overlay store: rows keyed by encoded address bytes, so
/// iteration order follows `(entity_type, entity_id, field, language)`.
/// Single-threaded; intended for tests and embedded use.
///

#[derive(Debug, Default)]
pub struct MemoryOverlayStore {
    rows: RefCell<BTreeMap<Vec<u8>, String>>,
    unavailable: Cell<bool>,
}

impl MemoryOverlayStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going away; every call fails until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    /// Every stored record in key order.
    pub fn records(&self) -> Result<Vec<OverlayRecord>, InternalError> {
        self.check_available()?;

        self.rows
            .borrow()
            .iter()
            .map(|(key, text)| decode_row(key, text))
            .collect()
    }

    fn check_available(&self) -> Result<(), InternalError> {
        if self.unavailable.get() {
            return Err(InternalError::store_unavailable(
                "memory overlay store is unavailable",
            ));
        }

        Ok(())
    }
}

fn decode_row(key: &[u8], text: &str) -> Result<OverlayRecord, InternalError> {
    let address = Address::from_key_bytes(key)
        .map_err(|err| InternalError::store_corruption(format!("overlay row key: {err}")))?;

    Ok(OverlayRecord::new(address, text.to_string()))
}

impl OverlayStore for MemoryOverlayStore {
    fn fetch(&self, filter: &OverlayFilter) -> Result<Vec<OverlayRecord>, InternalError> {
        self.check_available()?;

        let mut out = Vec::new();
        for (key, text) in self.rows.borrow().iter() {
            let record = decode_row(key, text)?;
            if filter.matches(&record.address) {
                out.push(record);
            }
        }

        Ok(out)
    }

    fn get(&self, address: &Address) -> Result<Option<OverlayRecord>, InternalError> {
        self.check_available()?;

        // An address that cannot be encoded was never stored.
        let Ok(key) = address.to_key_bytes() else {
            return Ok(None);
        };

        Ok(self
            .rows
            .borrow()
            .get(&key)
            .map(|text| OverlayRecord::new(address.clone(), text.clone())))
    }

    fn upsert(&self, address: Address, text: String) -> Result<(), InternalError> {
        self.check_available()?;
        let key = address.to_key_bytes()?;
        self.rows.borrow_mut().insert(key, text);

        Ok(())
    }

    // Every key is encoded before any row changes.
    fn upsert_all(&self, records: Vec<OverlayRecord>) -> Result<(), InternalError> {
        self.check_available()?;

        let encoded = records
            .into_iter()
            .map(|record| Ok((record.address.to_key_bytes()?, record.text)))
            .collect::<Result<Vec<_>, AddressError>>()?;

        self.rows.borrow_mut().extend(encoded);

        Ok(())
    }

    fn purge_entity(&self, entity_type: &str, entity_id: &str) -> Result<usize, InternalError> {
        self.check_available()?;

        let mut rows = self.rows.borrow_mut();
        let mut doomed = Vec::new();
        for key in rows.keys() {
            let address = Address::from_key_bytes(key).map_err(|err| {
                InternalError::store_corruption(format!("overlay row key: {err}"))
            })?;
            if address.entity_type == entity_type && address.entity_id == entity_id {
                doomed.push(key.clone());
            }
        }

        for key in &doomed {
            rows.remove(key);
        }

        Ok(doomed.len())
    }
}
