use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventReport
/// Ephemeral, in-memory counters for overlay operations.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Overlay store round trips
    pub overlay_fetches: u64,
    pub overlay_records_read: u64,
    pub overlay_writes: u64,
    pub overlay_purges: u64,

    // Apply path
    pub apply_calls: u64,
    pub instances_walked: u64,
    pub fields_applied: u64,

    // Sync path
    pub sync_calls: u64,

    // Query path
    pub predicates_rewritten: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub instances_walked: u64,
    pub fields_applied: u64,
    pub fields_synced: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventReport> = RefCell::new(EventReport::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventReport::default());
}

/// Snapshot the current counters.
pub(crate) fn report() -> EventReport {
    with_state(Clone::clone)
}
