//! Error types for SimpleDB operations.

/// Result type for all SimpleDB operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for SimpleDB backends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service rejected the request.
    #[error("SimpleDB error {code}: {message}")]
    Service {
        /// Service error code (e.g. `NoSuchDomain`).
        code: String,
        /// Human readable message returned by the service.
        message: String,
        /// HTTP status code, if the error came over the wire.
        status: Option<u16>,
        /// Request identifier reported by the service.
        request_id: Option<String>,
    },

    /// HTTP transport errors.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Malformed response: {reason}")]
    Response { reason: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a service error with the given code and message.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
            status: None,
            request_id: None,
        }
    }

    /// Create a `NoSuchDomain` service error.
    pub fn no_such_domain(domain: &str) -> Self {
        Self::service(
            "NoSuchDomain",
            format!("The specified domain does not exist: {domain}"),
        )
    }

    /// Create an `InvalidQueryExpression` service error.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::service("InvalidQueryExpression", reason)
    }

    /// Create a malformed response error.
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Attach the HTTP status and request id to a service error.
    pub(crate) fn with_wire_context(self, status: u16, request_id: Option<String>) -> Self {
        match self {
            Self::Service { code, message, .. } => Self::Service {
                code,
                message,
                status: Some(status),
                request_id,
            },
            other => other,
        }
    }

    /// Returns the service error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            Self::Http(e) if e.is_timeout() => Some("RequestTimeout"),
            _ => None,
        }
    }

    /// Returns the message without the error category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Service { message, .. } => message.clone(),
            Self::Response { reason } | Self::InvalidConfig { reason } => reason.clone(),
            Self::Http(e) => e.to_string(),
        }
    }

    /// Returns true for errors caused by the caller's configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::response(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = Error::no_such_domain("orders");
        assert_eq!(err.code(), Some("NoSuchDomain"));
        assert!(err.to_string().contains("NoSuchDomain"));
        assert!(err.message().contains("orders"));
    }

    #[test]
    fn test_wire_context() {
        let err = Error::service("InvalidParameterValue", "bad value")
            .with_wire_context(400, Some("req-1".into()));

        match err {
            Error::Service {
                status, request_id, ..
            } => {
                assert_eq!(status, Some(400));
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            _ => panic!("expected service error"),
        }
    }

    #[test]
    fn test_config_error() {
        let err = Error::invalid_config("missing access key");
        assert!(err.is_config());
        assert_eq!(err.code(), None);
    }
}
