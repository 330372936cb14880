//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Engine code never touches counters directly; it records `MetricsEvent`s
//! through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
