use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; the facade crate maps it onto the public taxonomy.
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

    /// Construct a configuration error for a specific origin.
    pub fn configuration(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, origin, message)
    }

    /// Construct an unsupported-operation error for a specific origin.
    pub fn unsupported(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, origin, message)
    }

    /// Construct a store-origin failure (read or write did not complete).
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Store, ErrorOrigin::Store, message)
    }

    /// Construct a store-origin corruption error.
    pub(crate) fn store_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Store, message)
    }

    /// Construct a walker-origin configuration error.
    pub(crate) fn walker_configuration(message: impl Into<String>) -> Self {
        Self::configuration(ErrorOrigin::Walker, message)
    }

    pub(crate) fn walker_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Walker, message)
    }

    /// Construct a context-origin invariant failure.
    pub(crate) fn context_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Context, message)
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self.class, ErrorClass::Store | ErrorClass::Corruption)
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Caller or programmer mistake; never retried.
    Configuration,
    /// Store read or write failed.
    Store,
    /// Query shape the engine cannot express.
    Unsupported,
    /// Stored bytes could not be decoded.
    Corruption,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Store => "store",
            Self::Unsupported => "unsupported",
            Self::Corruption => "corruption",
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
    Address,
    Config,
    Context,
    Overlay,
    Query,
    Registry,
    Store,
    Walker,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Address => "address",
            Self::Config => "config",
            Self::Context => "context",
            Self::Overlay => "overlay",
            Self::Query => "query",
            Self::Registry => "registry",
            Self::Store => "store",
            Self::Walker => "walker",
        };
        write!(f, "{label}")
    }
}
