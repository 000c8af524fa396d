//! Network-related error types.
//!
//! Covers everything between "request issued" and "typed payload in hand":
//! transport failures, non-success statuses, `ok: false` envelopes and
//! malformed bodies.

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed (refused, unreachable, reset).
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    Timeout { operation: String, message: String },

    /// HTTP status error (non-2xx response).
    HttpStatus { status: u16, message: String },

    /// The server answered 2xx but the envelope said `ok: false`.
    Rejected { operation: String },

    /// Response body could not be decoded into the expected shape.
    InvalidResponse { message: String },

    /// Request URL could not be built or parsed.
    InvalidUrl { url: String },

    /// Generic transport error.
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::Rejected { .. } => false,
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::InvalidUrl { .. } => false,
            NetworkError::Other { .. } => true,
        }
    }

    /// True for failures that happened before the server produced an answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed { .. }
                | NetworkError::Timeout { .. }
                | NetworkError::Other { .. }
        )
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } | NetworkError::Other { .. } => {
                "Sorry, I could not connect to the server. Please check if the backend is running and try again.".to_string()
            }
            NetworkError::Timeout { operation, .. } => {
                format!(
                    "The {} request timed out. The server may be slow or unreachable.",
                    operation
                )
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                401 => "Session expired. Please log in again.".to_string(),
                404 => "The conversation was not found. It may have been deleted.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!(
                    "The server returned an error (HTTP {}). Please try again.",
                    status
                ),
            },
            NetworkError::Rejected { operation } => {
                format!("The server refused to {}.", operation.replace('_', " "))
            }
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server. Please try again.".to_string()
            }
            NetworkError::InvalidUrl { .. } => {
                "The server address is invalid. Check your configuration.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::Rejected { .. } => "E_NET_REJECTED",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::InvalidUrl { .. } => "E_NET_URL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation, message } => {
                write!(f, "{} timed out: {}", operation, message)
            }
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::Rejected { operation } => {
                write!(f, "{} not ok", operation)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::InvalidUrl { url } => write!(f, "Invalid URL: {}", url),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify a transport-level [`HttpError`] for the request to `url`.
pub fn classify_http_error(err: HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        HttpError::Timeout(message) => NetworkError::Timeout {
            operation: "HTTP request".to_string(),
            message,
        },
        HttpError::InvalidUrl(url) => NetworkError::InvalidUrl { url },
        HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
    }
}
