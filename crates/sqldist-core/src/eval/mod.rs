//! Module: eval
//! Responsibility: branch-distance evaluation of a condition over one row.
//! Does not own: translation (see `condition`) or row sourcing (see `facade`).
//! Boundary: leaf failures degrade to `INF_DISTANCE` locally; only an
//! expired deadline aborts the whole evaluation.

mod compare;
mod like;
mod outcome;


use crate::{
    condition::{CompareOp, ConditionFingerprint, ConditionNode, Expr},
    config::DistanceConfig,
    distance::Distance,
    driver::{DriverError, QueryResult, SqlDriver},
    error::InternalError,
    logging::{WarnOnce, sqldist_log},
    obs::{MetricsEvent, MetricsSink, QueryKind},
    row::EvaluationContext,
    value::Value,
};
use compare::{arithmetic, compare_values};
use outcome::{Outcome, UnknownCause};
use std::{
    borrow::Cow,
    panic::{AssertUnwindSafe, catch_unwind},
    time::{Duration, Instant},
};

// re-exports
pub use like::like_distance;

static DEFAULT_CONFIG: DistanceConfig = DistanceConfig::DEFAULT;

const SUBQUERY_FAILED: &str = "subquery_failed";

///
/// Deadline
///
/// Wall-clock budget shared by every node of one computation.
///

#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    #[must_use]
    pub fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    #[must_use]
    pub fn unbounded() -> Self {
        Self::start(None)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() >= limit)
    }

    /// Budget left before expiry, or `None` when unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.limit.map(|limit| limit.saturating_sub(self.elapsed()))
    }

    pub(crate) fn check(&self) -> Result<(), InternalError> {
        if self.is_expired() {
            Err(InternalError::timeout(self.elapsed()))
        } else {
            Ok(())
        }
    }

    /// Run `query` with whatever is left of the budget. The outer error is an
    /// expired deadline, including a timeout reported by the driver; the inner
    /// one is an ordinary driver failure.
    pub(crate) fn execute(
        &self,
        driver: &dyn SqlDriver,
        query: &str,
    ) -> Result<Result<QueryResult, DriverError>, InternalError> {
        self.check()?;

        let result = catch_unwind(AssertUnwindSafe(|| match self.remaining() {
            Some(budget) => driver.execute_with_timeout(query, budget),
            None => driver.execute(query),
        }))
        .unwrap_or_else(|_| Err(DriverError::execution(query, "driver panicked")));

        if matches!(result, Err(DriverError::Timeout { .. })) {
            return Err(InternalError::timeout(self.elapsed()));
        }
        self.check()?;

        Ok(result)
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

///
/// FailureScope
///
/// Condition identity used to attach and de-duplicate failure warnings.
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct FailureScope<'a> {
    pub(crate) condition: &'a str,
    pub(crate) fingerprint: ConditionFingerprint,
    pub(crate) warned: &'a WarnOnce,
}

///
/// DistanceCalculator
///
/// Recursive scorer over `ConditionNode`. Holds only borrowed, read-only
/// state, so one calculator may serve many rows and threads.
///

#[derive(Clone, Copy)]
pub struct DistanceCalculator<'a> {
    config: &'a DistanceConfig,
    driver: Option<&'a dyn SqlDriver>,
    sink: Option<&'a dyn MetricsSink>,
    deadline: Deadline,
    scope: Option<FailureScope<'a>>,
}

impl<'a> DistanceCalculator<'a> {
    #[must_use]
    pub fn new(config: &'a DistanceConfig) -> Self {
        Self {
            config,
            driver: None,
            sink: None,
            deadline: Deadline::unbounded(),
            scope: None,
        }
    }

    /// Attach the driver used for `IN (subquery)` and `EXISTS`.
    #[must_use]
    pub fn with_driver(mut self, driver: &'a dyn SqlDriver) -> Self {
        self.driver = Some(driver);
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: &'a dyn MetricsSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub(crate) const fn with_scope(mut self, scope: FailureScope<'a>) -> Self {
        self.scope = Some(scope);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &'a DistanceConfig {
        self.config
    }

    /// Score `node` against the row in `ctx`. Total: every failure,
    /// including an expired deadline, yields `INF_DISTANCE`.
    #[must_use]
    pub fn evaluate(&self, node: &ConditionNode, ctx: &EvaluationContext<'_>) -> Distance {
        match self.try_evaluate(node, ctx) {
            Ok(distance) => distance,
            Err(err) => {
                sqldist_log!(
                    log::Level::Debug,
                    "evaluation_aborted",
                    "error={}",
                    err.display_with_class()
                );
                crate::distance::INF_DISTANCE
            }
        }
    }

    /// Score `node`, surfacing an expired deadline as an error.
    pub(crate) fn try_evaluate(
        &self,
        node: &ConditionNode,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Distance, InternalError> {
        self.eval_node(node, ctx).map(Outcome::distance)
    }

    fn eval_node(
        &self,
        node: &ConditionNode,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Outcome, InternalError> {
        self.deadline.check()?;

        let outcome = match node {
            ConditionNode::Comparison { op, left, right } => {
                match (self.eval_expr(left, ctx), self.eval_expr(right, ctx)) {
                    (Ok(l), Ok(r)) => compare_values(self.config, *op, &l, &r),
                    (Err(a), Err(b)) => Outcome::Unknown(a).and(Outcome::Unknown(b)),
                    (Err(cause), _) | (_, Err(cause)) => Outcome::Unknown(cause),
                }
            }

            ConditionNode::And(children) => {
                let mut total = Outcome::SATISFIED;
                for child in children {
                    total = total.and(self.eval_node(child, ctx)?);
                }
                total
            }

            ConditionNode::Or(children) => {
                let mut best: Option<Outcome> = None;
                for child in children {
                    let outcome = self.eval_node(child, ctx)?;
                    if outcome.is_satisfied() {
                        return Ok(outcome);
                    }
                    best = Some(best.map_or(outcome, |b| b.or(outcome)));
                }
                // an empty disjunction is never satisfied
                best.unwrap_or_else(Outcome::invalid)
            }

            ConditionNode::Not(inner) => self
                .eval_node(inner, ctx)?
                .negate(self.config.not_equal_penalty),

            ConditionNode::IsNull { expr, negated } => match self.eval_expr(expr, ctx) {
                Ok(value) => self.flag(value.is_null() != *negated),
                Err(cause) => Outcome::Unknown(cause),
            },

            ConditionNode::Between { expr, low, high } => match self.eval_expr(expr, ctx) {
                Ok(value) => {
                    let lower = self.compare_with(CompareOp::Gte, &value, low, ctx);
                    let upper = self.compare_with(CompareOp::Lte, &value, high, ctx);
                    lower.and(upper)
                }
                Err(cause) => Outcome::Unknown(cause),
            },

            ConditionNode::InList { expr, candidates } => match self.eval_expr(expr, ctx) {
                Ok(value) => {
                    let mut best: Option<Outcome> = None;
                    for candidate in candidates {
                        let outcome = self.compare_with(CompareOp::Eq, &value, candidate, ctx);
                        if outcome.is_satisfied() {
                            return Ok(outcome);
                        }
                        best = Some(best.map_or(outcome, |b| b.or(outcome)));
                    }
                    best.unwrap_or_else(Outcome::invalid)
                }
                Err(cause) => Outcome::Unknown(cause),
            },

            ConditionNode::InSubselect { expr, subquery } => match self.eval_expr(expr, ctx) {
                Ok(value) if value.is_null() => Outcome::missing(),
                Ok(value) => self.in_subselect(&value, subquery)?,
                Err(cause) => Outcome::Unknown(cause),
            },

            ConditionNode::Exists { subquery } => {
                match self.run_subquery(subquery, QueryKind::Exists)? {
                    Some(rows) => self.flag(!rows.is_empty()),
                    None => Outcome::invalid(),
                }
            }

            ConditionNode::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
            } => match (self.eval_expr(expr, ctx), self.eval_expr(pattern, ctx)) {
                (Ok(text), Ok(pattern)) => self.like(&text, &pattern, *negated, *case_insensitive),
                (Err(a), Err(b)) => Outcome::Unknown(a).and(Outcome::Unknown(b)),
                (Err(cause), _) | (_, Err(cause)) => Outcome::Unknown(cause),
            },
        };

        Ok(outcome)
    }

    // 0 when the predicate holds, K otherwise.
    fn flag(&self, satisfied: bool) -> Outcome {
        if satisfied {
            Outcome::SATISFIED
        } else {
            Outcome::known(self.config.not_equal_penalty)
        }
    }

    fn compare_with(
        &self,
        op: CompareOp,
        value: &Value,
        other: &Expr,
        ctx: &EvaluationContext<'_>,
    ) -> Outcome {
        match self.eval_expr(other, ctx) {
            Ok(other) => compare_values(self.config, op, value, &other),
            Err(cause) => Outcome::Unknown(cause),
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn like(&self, text: &Value, pattern: &Value, negated: bool, case_insensitive: bool) -> Outcome {
        let (Some(text), Some(pattern)) = (text.render_text(), pattern.render_text()) else {
            return Outcome::missing();
        };

        let edits = like_distance(&text, &pattern, case_insensitive);
        if negated {
            self.flag(edits > 0)
        } else {
            Outcome::known(edits as f64)
        }
    }

    fn in_subselect(&self, value: &Value, subquery: &str) -> Result<Outcome, InternalError> {
        let Some(rows) = self.run_subquery(subquery, QueryKind::Subselect)? else {
            return Ok(Outcome::invalid());
        };

        let matched = rows.iter().filter_map(|row| row.first_value()).any(|candidate| {
            compare_values(self.config, CompareOp::Eq, value, candidate).is_satisfied()
        });

        Ok(self.flag(matched))
    }

    // Scalar operand of a node. Literals borrow from the tree, columns from the row.
    fn eval_expr<'v>(
        &self,
        expr: &'v Expr,
        ctx: &EvaluationContext<'v>,
    ) -> Result<Cow<'v, Value>, UnknownCause> {
        match expr {
            Expr::Literal(value) => Ok(Cow::Borrowed(value)),
            Expr::Column(column) => ctx
                .value_of(column)
                .map(Cow::Borrowed)
                .ok_or(UnknownCause::Missing),
            Expr::Arithmetic { op, left, right } => {
                let left = self.eval_expr(left, ctx)?;
                let right = self.eval_expr(right, ctx)?;
                arithmetic(*op, &left, &right).map(Cow::Owned)
            }
        }
    }

    // Run a subquery; `None` means the driver failed (already logged).
    fn run_subquery(
        &self,
        query: &str,
        kind: QueryKind,
    ) -> Result<Option<QueryResult>, InternalError> {
        let Some(driver) = self.driver else {
            if self.should_warn() {
                let err = DriverError::unavailable("no driver attached");
                self.warn_subquery_failure(query, &err, "");
            }
            return Ok(None);
        };

        self.deadline.check()?;
        if let Some(sink) = self.sink {
            sink.record(MetricsEvent::DriverQuery { kind });
        }

        match self.deadline.execute(driver, query)? {
            Ok(rows) => Ok(Some(rows)),
            Err(err) => {
                if self.should_warn() {
                    let state = catch_unwind(AssertUnwindSafe(|| driver.dump_state()))
                        .unwrap_or_default();
                    self.warn_subquery_failure(query, &err, &state);
                }
                Ok(None)
            }
        }
    }

    // Claims the once-per-condition warning slot; unscoped calculators always warn.
    fn should_warn(&self) -> bool {
        self.scope
            .is_none_or(|scope| scope.warned.first(SUBQUERY_FAILED, scope.fingerprint))
    }

    fn warn_subquery_failure(&self, query: &str, err: &DriverError, state: &str) {
        match self.scope {
            Some(scope) => sqldist_log!(
                log::Level::Warn,
                SUBQUERY_FAILED,
                "condition={:?} fp={} query={query:?} error={err} state={state:?}",
                scope.condition,
                scope.fingerprint.short()
            ),
            None => sqldist_log!(
                log::Level::Warn,
                SUBQUERY_FAILED,
                "query={query:?} error={err} state={state:?}"
            ),
        }
    }
}

impl Default for DistanceCalculator<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_CONFIG)
    }
}

impl std::fmt::Debug for DistanceCalculator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceCalculator")
            .field("config", self.config)
            .field("driver", &self.driver.is_some())
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
