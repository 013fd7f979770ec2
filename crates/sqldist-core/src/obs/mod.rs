//! Observability: counters for distance computations and the sink abstraction.
//!
//! Evaluation logic never touches counters directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.

mod report;
mod sink;

// re-exports
pub use report::MetricsReport;
pub use sink::{CounterSink, MetricsEvent, MetricsSink, QueryKind};
