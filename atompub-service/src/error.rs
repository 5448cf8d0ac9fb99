//! Error types, HTTP classification, and response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using the framework error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the framework
///
/// Adapters and processors surface failures through this enum. Variants
/// with a well-known HTTP meaning map to that status; `Status` carries an
/// explicit code for adapters that compute one at runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Authorization error
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// HTTP method not supported by the target resource
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Resource conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Error with an explicit HTTP status code
    ///
    /// The escape hatch for adapters that carry a computed status. Codes
    /// outside the `StatusCode` range are treated as absent and classified
    /// as server errors.
    #[error("{message}")]
    Status {
        /// HTTP status code raised by the adapter
        status: u16,
        /// Human-readable error message
        message: String,
    },

    /// Transactional `start` hook failure
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// URL generation called with an unfillable template variable
    #[error("Invalid template parameters: {0}")]
    InvalidTemplateParameters(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Opaque adapter or extension failure
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// How the dispatcher should treat a raised error
///
/// Derived once at the dispatch boundary: the response status to emit and
/// whether the error is routine enough to stay out of the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDisposition {
    /// Status code for the generic error response
    pub status: StatusCode,

    /// True when the error carried an explicit status in `[400, 500)`
    pub client_error: bool,
}

impl Error {
    /// The explicit HTTP status carried by this error, if any
    ///
    /// Variants without a protocol-level meaning (I/O, internal, opaque)
    /// return `None` and default to 500 during classification.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Error::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            Error::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Error::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Error::MethodNotAllowed(_) => Some(StatusCode::METHOD_NOT_ALLOWED),
            Error::Conflict(_) => Some(StatusCode::CONFLICT),
            Error::Status { status, .. } => StatusCode::from_u16(*status).ok(),
            Error::Transaction(_)
            | Error::InvalidTemplateParameters(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Internal(_)
            | Error::Other(_) => None,
        }
    }

    /// Classify this error for dispatch
    ///
    /// Explicit statuses in `[400, 500)` are client errors; anything else,
    /// including statuses outside that band and errors with no status at
    /// all, is a server error. The response status preserves the original
    /// code when one exists, defaulting to 500.
    pub fn classify(&self) -> ErrorDisposition {
        match self.status_code() {
            Some(status) => ErrorDisposition {
                status,
                client_error: status.is_client_error(),
            },
            None => ErrorDisposition {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                client_error: false,
            },
        }
    }

    /// True when classification yields a client error
    pub fn is_client_error(&self) -> bool {
        self.classify().client_error
    }

    /// Create an error with an explicit status code
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Error::Status {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: status.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let disposition = self.classify();

        if !disposition.client_error {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse::new(disposition.status, self.to_string());
        (disposition.status, Json(body)).into_response()
    }
}

// Manual From implementation for the boxed config error
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_statuses() {
        assert_eq!(
            Error::NotFound("x".into()).status_code(),
            Some(StatusCode::NOT_FOUND)
        );
        assert_eq!(
            Error::BadRequest("x".into()).status_code(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            Error::Forbidden("x".into()).status_code(),
            Some(StatusCode::FORBIDDEN)
        );
        assert_eq!(
            Error::MethodNotAllowed("x".into()).status_code(),
            Some(StatusCode::METHOD_NOT_ALLOWED)
        );
        assert_eq!(
            Error::with_status(StatusCode::GONE, "gone").status_code(),
            Some(StatusCode::GONE)
        );
    }

    #[test]
    fn test_statusless_errors_have_no_code() {
        assert_eq!(Error::Internal("boom".into()).status_code(), None);
        assert_eq!(Error::Transaction("rollback".into()).status_code(), None);
        assert_eq!(
            Error::InvalidTemplateParameters("entry".into()).status_code(),
            None
        );
    }

    #[test]
    fn test_classify_client_errors() {
        let disposition = Error::Forbidden("no".into()).classify();
        assert_eq!(disposition.status, StatusCode::FORBIDDEN);
        assert!(disposition.client_error);

        let disposition = Error::Status {
            status: 404,
            message: "missing".into(),
        }
        .classify();
        assert_eq!(disposition.status, StatusCode::NOT_FOUND);
        assert!(disposition.client_error);
    }

    #[test]
    fn test_classify_server_errors() {
        // No status at all defaults to 500
        let disposition = Error::Internal("boom".into()).classify();
        assert_eq!(disposition.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!disposition.client_error);

        // Explicit 5xx keeps its code but is still a server error
        let disposition = Error::Status {
            status: 503,
            message: "down".into(),
        }
        .classify();
        assert_eq!(disposition.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!disposition.client_error);

        // Codes below 400 carry through but never count as client errors
        let disposition = Error::Status {
            status: 302,
            message: "moved".into(),
        }
        .classify();
        assert_eq!(disposition.status, StatusCode::FOUND);
        assert!(!disposition.client_error);
    }

    #[test]
    fn test_classify_out_of_range_status() {
        let disposition = Error::Status {
            status: 42,
            message: "bogus".into(),
        }
        .classify();
        assert_eq!(disposition.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!disposition.client_error);
    }

    #[test]
    fn test_transaction_failure_is_server_error() {
        let err = Error::Transaction("start refused".into());
        assert!(!err.is_client_error());
        assert_eq!(err.classify().status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_body() {
        let body = ErrorResponse::new(StatusCode::CONFLICT, "duplicate entry");
        assert_eq!(body.status, 409);
        assert_eq!(body.error, "duplicate entry");

        let json = serde_json::to_string(&body).expect("serializable");
        assert!(json.contains("duplicate entry"));
        assert!(json.contains("409"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: Error = anyhow::anyhow!("adapter exploded").into();
        assert_eq!(err.status_code(), None);
        assert!(!err.is_client_error());
    }
}
