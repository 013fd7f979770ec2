use crate::{condition::TranslateError, driver::DriverError};
use std::{fmt, time::Duration};
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured pipeline error with a stable internal classification.
/// Never escapes the facade; it is logged and folded into `INF_DISTANCE`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an evaluation deadline error.
    pub(crate) fn timeout(elapsed: Duration) -> Self {
        Self::new(
            ErrorClass::Timeout,
            ErrorOrigin::Evaluate,
            format!("distance computation exceeded its deadline after {elapsed:?}"),
        )
    }

    /// Construct a facade-origin error for a missing probe source.
    pub(crate) fn no_probe_source(condition: &str) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Facade,
            format!("cannot derive a probe query for condition: {condition}"),
        )
    }

    /// Construct a driver-origin error from a caught panic payload.
    pub(crate) fn driver_panic(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Internal,
            ErrorOrigin::Driver,
            format!("driver panicked: {}", message.into()),
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.class, ErrorClass::Timeout)
    }
}

impl From<TranslateError> for InternalError {
    fn from(err: TranslateError) -> Self {
        let class = match err {
            TranslateError::Parse(_) | TranslateError::TrailingInput { .. } => {
                ErrorClass::Malformed
            }
            _ => ErrorClass::Unsupported,
        };

        Self::new(class, ErrorOrigin::Translate, err.to_string())
    }
}

impl From<DriverError> for InternalError {
    fn from(err: DriverError) -> Self {
        let class = match err {
            DriverError::Timeout { .. } => ErrorClass::Timeout,
            _ => ErrorClass::Driver,
        };

        Self::new(class, ErrorOrigin::Driver, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Malformed,
    Unsupported,
    Driver,
    Timeout,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Malformed => "malformed",
            Self::Unsupported => "unsupported",
            Self::Driver => "driver",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Translate,
    Evaluate,
    Driver,
    Facade,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Translate => "translate",
            Self::Evaluate => "evaluate",
            Self::Driver => "driver",
            Self::Facade => "facade",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_timeout_is_classified_as_timeout() {
        let timed_out = InternalError::from(DriverError::timeout("SELECT 1"));
        let failed = InternalError::from(DriverError::execution("SELECT 1", "boom"));

        assert!(timed_out.is_timeout());
        assert_eq!(timed_out.origin, ErrorOrigin::Driver);
        assert!(!failed.is_timeout());
        assert_eq!(failed.class, ErrorClass::Driver);
    }
}
