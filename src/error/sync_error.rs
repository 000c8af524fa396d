//! Unified error type for the sync engine.
//!
//! `SyncError` wraps every domain-specific error so callers get one type with
//! consistent categorization, retry logic and user messaging.

use std::fmt;

use super::auth::AuthError;
use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::storage::StorageError;
use super::validation::ValidationError;

/// Unified error type for chatsync.
#[derive(Debug)]
pub enum SyncError {
    /// Transport failures, non-success statuses and bad payloads.
    Network(NetworkError),

    /// The session was denied or is missing.
    Auth(AuthError),

    /// Local persistence failures.
    Storage(StorageError),

    /// Rejected user input.
    Validation(ValidationError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<SyncError>,
        context: ErrorContext,
    },
}

impl SyncError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::Network(err) => {
                if err.is_transport() {
                    ErrorCategory::Network
                } else if err.status() == Some(401) {
                    ErrorCategory::Auth
                } else {
                    ErrorCategory::Server
                }
            }
            SyncError::Auth(_) => ErrorCategory::Auth,
            SyncError::Storage(_) => ErrorCategory::Storage,
            SyncError::Validation(_) => ErrorCategory::User,
            SyncError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Network(err) => err.is_retryable(),
            SyncError::Auth(_) | SyncError::Validation(_) => false,
            SyncError::Storage(err) => matches!(err, StorageError::Io(_)),
            SyncError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Network(err) => err.user_message(),
            SyncError::Auth(err) => err.user_message(),
            SyncError::Storage(err) => err.user_message(),
            SyncError::Validation(err) => err.user_message(),
            SyncError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Network(err) => err.error_code(),
            SyncError::Auth(err) => err.error_code(),
            SyncError::Storage(err) => err.error_code(),
            SyncError::Validation(err) => err.error_code(),
            SyncError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        SyncError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SyncError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &SyncError {
        match self {
            SyncError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// Check if this error ends the session.
    pub fn requires_reauth(&self) -> bool {
        match self {
            SyncError::Auth(err) => err.requires_reauth(),
            SyncError::WithContext { error, .. } => error.requires_reauth(),
            _ => false,
        }
    }

    /// True when the server reported the thread as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.inner(),
            SyncError::Network(NetworkError::HttpStatus { status: 404, .. })
        )
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Network(err) => write!(f, "{}", err),
            SyncError::Auth(err) => write!(f, "{}", err),
            SyncError::Storage(err) => write!(f, "{}", err),
            SyncError::Validation(err) => write!(f, "{}", err),
            SyncError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Network(err) => Some(err),
            SyncError::Auth(err) => Some(err),
            SyncError::Storage(err) => Some(err),
            SyncError::Validation(err) => Some(err),
            SyncError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<NetworkError> for SyncError {
    fn from(err: NetworkError) -> Self {
        SyncError::Network(err)
    }
}

impl From<AuthError> for SyncError {
    fn from(err: AuthError) -> Self {
        SyncError::Auth(err)
    }
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        SyncError::Storage(err)
    }
}

impl From<ValidationError> for SyncError {
    fn from(err: ValidationError) -> Self {
        SyncError::Validation(err)
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_transport_errors_are_network_category() {
        let err = SyncError::Network(NetworkError::ConnectionFailed {
            url: "http://127.0.0.1:8000".to_string(),
            message: "refused".to_string(),
        });
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_status_and_envelope_errors_are_server_category() {
        let status = SyncError::Network(NetworkError::HttpStatus {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(status.category(), ErrorCategory::Server);

        let rejected = SyncError::Network(NetworkError::Rejected {
            operation: "sync_thread".to_string(),
        });
        assert_eq!(rejected.category(), ErrorCategory::Server);
        assert!(!rejected.is_retryable());

        let invalid: SyncError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(invalid.category(), ErrorCategory::Server);
    }

    #[test]
    fn test_auth_errors() {
        let err: SyncError = AuthError::SessionExpired.into();
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(err.requires_reauth());
        assert!(!err.is_retryable());

        // A bare 401 status outside chat is categorized but does not end the session
        let status = SyncError::Network(NetworkError::HttpStatus {
            status: 401,
            message: String::new(),
        });
        assert_eq!(status.category(), ErrorCategory::Auth);
        assert!(!status.requires_reauth());
    }

    #[test]
    fn test_storage_and_validation_categories() {
        let err: SyncError = StorageError::Unavailable("no home".to_string()).into();
        assert_eq!(err.category(), ErrorCategory::Storage);

        let err: SyncError = ValidationError::EmptyTitle.into();
        assert_eq!(err.category(), ErrorCategory::User);
        assert_eq!(err.error_code(), "E_VAL_TITLE");
    }

    #[test]
    fn test_with_context_delegates() {
        let err: SyncError = NetworkError::HttpStatus {
            status: 404,
            message: "Thread not found".to_string(),
        }
        .into();
        let err = err.with_context(ErrorContext::new("get_thread").with_thread_id("t_1"));

        assert!(err.context().is_some());
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.error_code(), "E_NET_HTTP");
        assert!(err.to_string().ends_with("([get_thread] thread=t_1)"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_inner_unwraps_nested_context() {
        let err: SyncError = AuthError::NotLoggedIn.into();
        let err = err
            .with_context(ErrorContext::new("inner"))
            .with_context(ErrorContext::new("outer"));

        assert!(matches!(err.inner(), SyncError::Auth(AuthError::NotLoggedIn)));
        assert_eq!(err.context().map(|c| c.operation.as_str()), Some("outer"));
    }
}
