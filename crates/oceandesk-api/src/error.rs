//! Error types for backend requests.

use crate::transport::Method;

/// Result type alias for backend requests.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Uniform failure raised by the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection or protocol failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{method} {path} failed with status {status}: {body}")]
    Status {
        /// Request method.
        method: Method,
        /// Request path.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body (may be empty).
        body: String,
    },

    /// The request exceeded the configured timeout.
    #[error("{method} {path} timed out")]
    Timeout {
        /// Request method.
        method: Method,
        /// Request path.
        path: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// Returns the HTTP status code if the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened before any response was received.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}
