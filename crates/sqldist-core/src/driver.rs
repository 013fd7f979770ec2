//! Module: driver
//! Responsibility: the query-execution seam used for probe queries and subselects.
//! Does not own: connection management or SQL dialect handling.
//! Boundary: drivers return rows or a `DriverError`; panics are caught by the caller.

use crate::row::Row;
use derive_more::{Deref, IntoIterator};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// SqlDriver
///
/// Executes read-only SQL against the database under test.
/// Implementations must be shareable across threads; the engine never
/// mutates through a driver.
///
/// The engine cannot preempt a running query. A driver that may block should
/// override `execute_with_timeout` and give up with `DriverError::Timeout`
/// once the budget is spent.
///

pub trait SqlDriver: Send + Sync {
    /// Run one query and return its rows in result order.
    fn execute(&self, query: &str) -> Result<QueryResult, DriverError>;

    /// Run one query within `timeout`. The default ignores the budget.
    fn execute_with_timeout(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<QueryResult, DriverError> {
        let _ = timeout;
        self.execute(query)
    }

    /// Human-readable snapshot of the driver state, attached to failure logs.
    fn dump_state(&self) -> String {
        String::new()
    }
}

impl<T: SqlDriver + ?Sized> SqlDriver for &T {
    fn execute(&self, query: &str) -> Result<QueryResult, DriverError> {
        (**self).execute(query)
    }

    fn execute_with_timeout(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<QueryResult, DriverError> {
        (**self).execute_with_timeout(query, timeout)
    }

    fn dump_state(&self) -> String {
        (**self).dump_state()
    }
}

///
/// QueryResult
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
pub struct QueryResult(#[into_iterator(owned, ref)] Vec<Row>);

impl QueryResult {
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self(rows)
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.0
    }
}

impl From<Vec<Row>> for QueryResult {
    fn from(rows: Vec<Row>) -> Self {
        Self(rows)
    }
}

impl FromIterator<Row> for QueryResult {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// DriverError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DriverError {
    #[error("query failed: {message} (query: {query})")]
    Execution { query: String, message: String },

    #[error("query timed out: {query}")]
    Timeout { query: String },

    #[error("driver unavailable: {message}")]
    Unavailable { message: String },
}

impl DriverError {
    pub fn execution(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            query: query.into(),
            message: message.into(),
        }
    }

    pub fn timeout(query: impl Into<String>) -> Self {
        Self::Timeout {
            query: query.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

///
/// NoDriver
///
/// Driver used when the caller supplies rows and no database is attached.
/// Every query fails as `Unavailable`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoDriver;

impl SqlDriver for NoDriver {
    fn execute(&self, _query: &str) -> Result<QueryResult, DriverError> {
        Err(DriverError::unavailable("no driver attached"))
    }

    fn dump_state(&self) -> String {
        "no driver attached".to_string()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn no_driver_rejects_every_query() {
        let err = NoDriver.execute("SELECT 1").expect_err("no driver must fail");

        assert!(matches!(err, DriverError::Unavailable { .. }));
    }

    #[test]
    fn default_timeout_variant_delegates_to_execute() {
        let err = NoDriver
            .execute_with_timeout("SELECT 1", Duration::from_millis(5))
            .expect_err("no driver must fail");

        assert!(matches!(err, DriverError::Unavailable { .. }));
    }

    #[test]
    fn query_result_derefs_to_rows() {
        let result: QueryResult = vec![Row::new().with_unqualified("x", 1)].into();

        assert_eq!(result.len(), 1);
        assert_eq!(result.first().and_then(Row::first_value), Some(&Value::Int(1)));
    }
}
