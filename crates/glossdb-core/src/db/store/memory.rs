use crate::{
    db::{
        overlay::OverlayStore,
        predicate::{Predicate, eval},
        store::EntityStore,
    },
    error::InternalError,
    traits::{EntityKind, Translatable},
};
use std::{cell::RefCell, collections::BTreeMap};

///
/// MemoryEntityStore
///
/// Reference entity store keyed by identity. Evaluates predicates row by
/// row, resolving overlay nodes through the shared overlay store, and
/// cascades overlay cleanup on delete.
///

pub struct MemoryEntityStore<'a, E> {
    rows: RefCell<BTreeMap<String, E>>,
    overlay: &'a dyn OverlayStore,
}

impl<'a, E> MemoryEntityStore<'a, E>
where
    E: EntityKind + Translatable + Clone,
{
    #[must_use]
    pub fn new(overlay: &'a dyn OverlayStore) -> Self {
        Self {
            rows: RefCell::new(BTreeMap::new()),
            overlay,
        }
    }

    /// Insert or replace by identity; returns the replaced entity.
    pub fn insert(&self, entity: E) -> Option<E> {
        self.rows.borrow_mut().insert(entity.identity(), entity)
    }

    /// Delete by identity, removing the entity's overlay records with it.
    pub fn delete(&self, id: &str) -> Result<Option<E>, InternalError> {
        if !self.rows.borrow().contains_key(id) {
            return Ok(None);
        }

        self.overlay.purge_entity(E::MODEL.type_tag, id)?;

        Ok(self.rows.borrow_mut().remove(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }
}

impl<E> EntityStore<E> for MemoryEntityStore<'_, E>
where
    E: EntityKind + Translatable + Clone,
{
    fn load(&self, id: &str) -> Result<Option<E>, InternalError> {
        Ok(self.rows.borrow().get(id).cloned())
    }

    fn query(&self, predicate: &Predicate) -> Result<Vec<E>, InternalError> {
        let rows = self.rows.borrow();
        let mut out = Vec::new();

        for entity in rows.values() {
            let row: &dyn Translatable = entity;
            if eval(row, predicate, self.overlay)? {
                out.push(entity.clone());
            }
        }

        Ok(out)
    }
}
