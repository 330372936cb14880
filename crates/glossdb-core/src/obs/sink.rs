//! Metrics sink boundary.
//!
//! Engine logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<&'static dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    OverlayFetch {
        pairs: u64,
        records: u64,
    },
    OverlayWrite {
        records: u64,
    },
    OverlayPurge {
        entity_type: &'static str,
    },
    Apply {
        instances: u64,
        fields: u64,
    },
    InstancesWalked {
        entity_type: &'static str,
        instances: u64,
    },
    FieldsApplied {
        entity_type: &'static str,
        fields: u64,
    },
    Sync {
        entity_type: &'static str,
        fields: u64,
    },
    Rewrite {
        leaves: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::OverlayFetch { records, .. } => metrics::with_state_mut(|m| {
                m.ops.overlay_fetches = m.ops.overlay_fetches.saturating_add(1);
                m.ops.overlay_records_read = m.ops.overlay_records_read.saturating_add(records);
            }),

            MetricsEvent::OverlayWrite { records } => metrics::with_state_mut(|m| {
                m.ops.overlay_writes = m.ops.overlay_writes.saturating_add(records);
            }),

            MetricsEvent::OverlayPurge { .. } => metrics::with_state_mut(|m| {
                m.ops.overlay_purges = m.ops.overlay_purges.saturating_add(1);
            }),

            MetricsEvent::Apply { instances, fields } => metrics::with_state_mut(|m| {
                m.ops.apply_calls = m.ops.apply_calls.saturating_add(1);
                m.ops.instances_walked = m.ops.instances_walked.saturating_add(instances);
                m.ops.fields_applied = m.ops.fields_applied.saturating_add(fields);
            }),

            MetricsEvent::InstancesWalked {
                entity_type,
                instances,
            } => metrics::with_state_mut(|m| {
                let entry = m.entities.entry(entity_type.to_string()).or_default();
                entry.instances_walked = entry.instances_walked.saturating_add(instances);
            }),

            MetricsEvent::FieldsApplied {
                entity_type,
                fields,
            } => metrics::with_state_mut(|m| {
                let entry = m.entities.entry(entity_type.to_string()).or_default();
                entry.fields_applied = entry.fields_applied.saturating_add(fields);
            }),

            MetricsEvent::Sync {
                entity_type,
                fields,
            } => metrics::with_state_mut(|m| {
                m.ops.sync_calls = m.ops.sync_calls.saturating_add(1);
                let entry = m.entities.entry(entity_type.to_string()).or_default();
                entry.fields_synced = entry.fields_synced.saturating_add(fields);
            }),

            MetricsEvent::Rewrite { leaves } => metrics::with_state_mut(|m| {
                m.ops.predicates_rewritten = m.ops.predicates_rewritten.saturating_add(leaves);
            }),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| *cell.borrow());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub(crate) fn with_metrics_sink<T>(sink: &'static dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<&'static dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSink {
        events: Cell<u64>,
    }

    // Sinks are `&'static`; leak one per test thread.
    fn counting_sink() -> &'static CountingSink {
        Box::leak(Box::new(CountingSink {
            events: Cell::new(0),
        }))
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _event: MetricsEvent) {
            self.events.set(self.events.get() + 1);
        }
    }

    #[test]
    fn global_sink_accumulates_counters() {
        metrics_reset_all();

        record(MetricsEvent::OverlayFetch {
            pairs: 3,
            records: 5,
        });
        record(MetricsEvent::Sync {
            entity_type: "blog.article",
            fields: 2,
        });

        let report = metrics_report();
        assert_eq!(report.ops.overlay_fetches, 1);
        assert_eq!(report.ops.overlay_records_read, 5);
        assert_eq!(report.ops.sync_calls, 1);
        assert_eq!(report.entities["blog.article"].fields_synced, 2);
    }

    #[test]
    fn override_sink_is_scoped() {
        metrics_reset_all();
        let sink = counting_sink();

        with_metrics_sink(sink, || record(MetricsEvent::Rewrite { leaves: 1 }));
        record(MetricsEvent::Rewrite { leaves: 1 });

        assert_eq!(sink.events.get(), 1);
        assert_eq!(metrics_report().ops.predicates_rewritten, 1);
    }
}
