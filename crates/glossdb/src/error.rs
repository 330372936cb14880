use derive_more::Display;
use glossdb_core::{
    config::ConfigError,
    db::{AddressError, QueryError, RegistryError},
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
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

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration)
    }

    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self.kind, ErrorKind::Store(_))
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.kind, ErrorKind::Unsupported)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Configuration => ErrorKind::Configuration,
            ErrorClass::Store => ErrorKind::Store(StoreErrorKind::Unavailable),
            ErrorClass::Corruption => ErrorKind::Store(StoreErrorKind::Corrupt),
            ErrorClass::Unsupported => ErrorKind::Unsupported,
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Configuration, ErrorOrigin::Config, err.to_string())
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::new(ErrorKind::Configuration, ErrorOrigin::Registry, err.to_string())
    }
}

impl From<AddressError> for Error {
    fn from(err: AddressError) -> Self {
        Self::new(
            ErrorKind::Store(StoreErrorKind::Corrupt),
            ErrorOrigin::Address,
            err.to_string(),
        )
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Unknown language, type, field or relation path; bad config.
    Configuration,

    /// The overlay or entity store failed.
    Store(StoreErrorKind),

    /// Valid request the engine cannot express.
    Unsupported,

    /// The caller cannot remediate this.
    Internal,
}

///
/// StoreErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StoreErrorKind {
    Unavailable,
    Corrupt,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Address,
    Config,
    Context,
    Overlay,
    Query,
    Registry,
    Store,
    Walker,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Address => Self::Address,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Context => Self::Context,
            CoreErrorOrigin::Overlay => Self::Overlay,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Registry => Self::Registry,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Walker => Self::Walker,
        }
    }
}
