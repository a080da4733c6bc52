//! Error types for document store operations.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Boxed source error that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of document store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The caller passed an input the store cannot act on.
    InvalidArgument,
    /// The backend failed while carrying out the operation.
    Runtime,
}

/// A document store error.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    code: Option<String>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Creates a runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Attaches the backend error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attaches a source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the backend error code, if the error came from the backend.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns true for invalid argument errors.
    pub fn is_invalid_argument(&self) -> bool {
        self.kind == ErrorKind::InvalidArgument
    }
}

/// Every backend fault enters the store's error space here.
impl From<nvisy_simpledb::Error> for Error {
    fn from(err: nvisy_simpledb::Error) -> Self {
        let mut error = Self::runtime(err.message());
        if let Some(code) = err.code() {
            error = error.with_code(code);
        }
        error.with_source(err)
    }
}
