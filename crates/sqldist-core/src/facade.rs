//! Module: facade
//! Responsibility: the total `calculate` entry point over condition text.
//! Does not own: translation rules or distance formulas.
//! Boundary: nothing escapes; every failure is logged and becomes `INF_DISTANCE`.

use crate::{
    cache::ConditionCache,
    condition::{ConditionFingerprint, ParsedCondition, parse_condition},
    config::DistanceConfig,
    distance::{Distance, INF_DISTANCE},
    driver::SqlDriver,
    error::{ErrorOrigin, InternalError},
    eval::{Deadline, DistanceCalculator, FailureScope},
    logging::{WarnOnce, sqldist_log},
    obs::{CounterSink, MetricsEvent, MetricsReport, MetricsSink, QueryKind},
    row::{EvaluationContext, Row},
};
use serde::Serialize;
use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

///
/// SqlDistance
///
/// Distance of one `calculate` call plus how it was obtained.
///

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SqlDistance {
    pub distance: Distance,
    pub rows_evaluated: u64,

    /// The pipeline failed (parse, probe, driver, timeout) and `distance`
    /// is the sentinel rather than an evaluated result.
    pub evaluation_failed: bool,
}

impl SqlDistance {
    const fn failed() -> Self {
        Self {
            distance: INF_DISTANCE,
            rows_evaluated: 0,
            evaluation_failed: true,
        }
    }

    const fn no_rows() -> Self {
        Self {
            distance: INF_DISTANCE,
            rows_evaluated: 0,
            evaluation_failed: false,
        }
    }
}

///
/// SqlDistanceEngine
///
/// Session-scoped entry point: owns the condition cache, the metrics sink,
/// and the warning de-duplication set. Safe to share across threads.
///

pub struct SqlDistanceEngine {
    config: DistanceConfig,
    cache: ConditionCache,
    sink: Arc<dyn MetricsSink>,
    warned: WarnOnce,
}

impl SqlDistanceEngine {
    #[must_use]
    pub fn new(config: DistanceConfig) -> Self {
        Self::with_sink(config, Arc::new(CounterSink::new()))
    }

    #[must_use]
    pub fn with_sink(config: DistanceConfig, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            config,
            cache: ConditionCache::new(),
            sink,
            warned: WarnOnce::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DistanceConfig {
        &self.config
    }

    #[must_use]
    pub const fn cache(&self) -> &ConditionCache {
        &self.cache
    }

    /// Counter snapshot; empty when the sink keeps no counters.
    #[must_use]
    pub fn metrics_report(&self) -> MetricsReport {
        self.sink.report().unwrap_or_default()
    }

    /// Forget cached conditions and reported warnings.
    pub fn reset_session(&self) {
        self.cache.clear();
        self.warned.clear();
    }

    /// Distance of `condition` over the rows returned by its probe query.
    #[must_use]
    pub fn calculate(&self, condition: &str, driver: &dyn SqlDriver) -> Distance {
        self.calculate_with_metrics(condition, None, driver).distance
    }

    /// Distance of `condition` over caller-supplied rows. The driver is
    /// only used for subqueries and diagnostics.
    #[must_use]
    pub fn calculate_rows(&self, condition: &str, rows: &[Row], driver: &dyn SqlDriver) -> Distance {
        self.calculate_with_metrics(condition, Some(rows), driver).distance
    }

    /// Minimum distance over the candidate rows, with evaluation details.
    /// Never panics and never fails.
    pub fn calculate_with_metrics(
        &self,
        condition: &str,
        rows: Option<&[Row]>,
        driver: &dyn SqlDriver,
    ) -> SqlDistance {
        let fingerprint = ConditionFingerprint::of(condition);
        let deadline = Deadline::start(self.config.timeout());

        let result = catch_unwind(AssertUnwindSafe(|| {
            self.run(condition, fingerprint, rows, driver, deadline)
        }))
        .unwrap_or_else(|payload| Err(InternalError::driver_panic(panic_message(&*payload))));

        match result {
            Ok(outcome) => {
                self.sink.record(MetricsEvent::Calculated {
                    rows_evaluated: outcome.rows_evaluated,
                });
                outcome
            }
            Err(err) => {
                self.sink.record(MetricsEvent::Failed { class: err.class });
                self.report_failure(condition, fingerprint, &err, driver);
                SqlDistance::failed()
            }
        }
    }

    fn run(
        &self,
        condition: &str,
        fingerprint: ConditionFingerprint,
        rows: Option<&[Row]>,
        driver: &dyn SqlDriver,
        deadline: Deadline,
    ) -> Result<SqlDistance, InternalError> {
        let parsed = self.translate(condition)?;

        let fetched;
        let rows = match rows {
            Some(rows) => rows,
            None => {
                let probe = parsed
                    .probe_query()
                    .ok_or_else(|| InternalError::no_probe_source(condition))?;

                deadline.check()?;
                self.sink.record(MetricsEvent::DriverQuery {
                    kind: QueryKind::Probe,
                });
                fetched = deadline.execute(driver, probe)??;

                fetched.as_slice()
            }
        };

        // no candidate rows carry no information
        if rows.is_empty() {
            return Ok(SqlDistance::no_rows());
        }

        // a statement without WHERE accepts any row
        let Some(node) = parsed.condition() else {
            return Ok(SqlDistance {
                distance: Distance::ZERO,
                rows_evaluated: 1,
                evaluation_failed: false,
            });
        };

        let calculator = DistanceCalculator::new(&self.config)
            .with_driver(driver)
            .with_sink(self.sink.as_ref())
            .with_deadline(deadline)
            .with_scope(FailureScope {
                condition,
                fingerprint,
                warned: &self.warned,
            });

        let mut best = INF_DISTANCE;
        let mut rows_evaluated = 0u64;
        for row in rows {
            let ctx = EvaluationContext::with_aliases(row, parsed.aliases());
            best = best.min(calculator.try_evaluate(node, &ctx)?);
            rows_evaluated += 1;

            if best.is_zero() {
                break;
            }
        }

        Ok(SqlDistance {
            distance: best,
            rows_evaluated,
            evaluation_failed: false,
        })
    }

    fn translate(&self, condition: &str) -> Result<Arc<ParsedCondition>, InternalError> {
        if !self.config.cache_conditions {
            return parse_condition(condition)
                .map(Arc::new)
                .map_err(InternalError::from);
        }

        let lookup = self.cache.get_or_parse(condition);
        self.sink.record(if lookup.hit {
            MetricsEvent::CacheHit
        } else {
            MetricsEvent::CacheMiss
        });

        lookup.translation.map_err(InternalError::from)
    }

    fn report_failure(
        &self,
        condition: &str,
        fingerprint: ConditionFingerprint,
        err: &InternalError,
        driver: &dyn SqlDriver,
    ) {
        let event = failure_event(err);
        if !self.warned.first(event, fingerprint) {
            return;
        }

        let state = catch_unwind(AssertUnwindSafe(|| driver.dump_state()))
            .unwrap_or_else(|_| "<dump_state panicked>".to_string());

        sqldist_log!(
            log::Level::Warn,
            event,
            "condition={condition:?} fp={} error={} state={state:?}",
            fingerprint.short(),
            err.display_with_class()
        );
    }
}

impl Default for SqlDistanceEngine {
    fn default() -> Self {
        Self::new(DistanceConfig::default())
    }
}

impl std::fmt::Debug for SqlDistanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlDistanceEngine")
            .field("config", &self.config)
            .field("cached_conditions", &self.cache.len())
            .finish_non_exhaustive()
    }
}

const fn failure_event(err: &InternalError) -> &'static str {
    if err.is_timeout() {
        return "calculate_timeout";
    }

    match err.origin {
        ErrorOrigin::Translate => "translate_failed",
        ErrorOrigin::Driver => "driver_failed",
        _ => "calculate_failed",
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }

    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

///
/// TESTS
///
