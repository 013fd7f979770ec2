//! Metrics sink boundary.
//!
//! The facade and evaluator emit `MetricsEvent`s; a sink decides what to
//! keep. Sinks are owned per engine, so independent engines never share
//! counters.

use crate::{error::ErrorClass, obs::MetricsReport};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// QueryKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryKind {
    Probe,
    Subselect,
    Exists,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricsEvent {
    CacheHit,
    CacheMiss,
    DriverQuery { kind: QueryKind },
    Calculated { rows_evaluated: u64 },
    Failed { class: ErrorClass },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);

    /// Snapshot of accumulated counters, for sinks that keep any.
    fn report(&self) -> Option<MetricsReport> {
        None
    }
}

///
/// CounterSink
/// Default sink accumulating relaxed atomic counters.
///

#[derive(Debug, Default)]
pub struct CounterSink {
    calculations: AtomicU64,
    rows_evaluated: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    probe_queries: AtomicU64,
    subqueries: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
}

impl CounterSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsReport {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        MetricsReport {
            calculations: load(&self.calculations),
            rows_evaluated: load(&self.rows_evaluated),
            cache_hits: load(&self.cache_hits),
            cache_misses: load(&self.cache_misses),
            probe_queries: load(&self.probe_queries),
            subqueries: load(&self.subqueries),
            failures: load(&self.failures),
            timeouts: load(&self.timeouts),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.calculations,
            &self.rows_evaluated,
            &self.cache_hits,
            &self.cache_misses,
            &self.probe_queries,
            &self.subqueries,
            &self.failures,
            &self.timeouts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

// Counters saturate instead of wrapping.
fn bump(counter: &AtomicU64, by: u64) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(by))
    });
}

impl MetricsSink for CounterSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::CacheHit => bump(&self.cache_hits, 1),
            MetricsEvent::CacheMiss => bump(&self.cache_misses, 1),
            MetricsEvent::DriverQuery { kind } => match kind {
                QueryKind::Probe => bump(&self.probe_queries, 1),
                QueryKind::Subselect | QueryKind::Exists => bump(&self.subqueries, 1),
            },
            MetricsEvent::Calculated { rows_evaluated } => {
                bump(&self.calculations, 1);
                bump(&self.rows_evaluated, rows_evaluated);
            }
            MetricsEvent::Failed { class } => {
                bump(&self.failures, 1);
                if class == ErrorClass::Timeout {
                    bump(&self.timeouts, 1);
                }
            }
        }
    }

    fn report(&self) -> Option<MetricsReport> {
        Some(self.snapshot())
    }
}

///
/// TESTS
///
