use derive_more::Display;
use serde::{Deserialize, Serialize};
use sqldist_core::{
    condition::TranslateError,
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
/// Only the fallible setup surface returns it; scoring never fails.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Malformed => ErrorKind::Malformed,
            ErrorClass::Unsupported => ErrorKind::Unsupported,
            ErrorClass::Driver => ErrorKind::Driver,
            ErrorClass::Timeout => ErrorKind::Timeout,
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<TranslateError> for Error {
    fn from(err: TranslateError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Config,
    Malformed,
    Unsupported,
    Driver,
    Timeout,
    Internal,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Translate,
    Evaluate,
    Driver,
    Facade,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Translate => Self::Translate,
            CoreErrorOrigin::Evaluate => Self::Evaluate,
            CoreErrorOrigin::Driver => Self::Driver,
            CoreErrorOrigin::Facade => Self::Facade,
        }
    }
}
