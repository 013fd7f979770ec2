use serde::{Deserialize, Serialize};

///
/// MetricsReport
/// Point-in-time counter snapshot of one engine.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MetricsReport {
    pub calculations: u64,
    pub rows_evaluated: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub probe_queries: u64,
    pub subqueries: u64,
    pub failures: u64,
    pub timeouts: u64,
}

impl MetricsReport {
    /// Fraction of condition lookups served from the cache.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn cache_hit_ratio(&self) -> Option<f64> {
        let total = self.cache_hits.saturating_add(self.cache_misses);
        (total > 0).then(|| self.cache_hits as f64 / total as f64)
    }
}
