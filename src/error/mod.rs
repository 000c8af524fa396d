//! Unified error handling for chatsync.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain-specific Errors**: network, auth, storage and validation errors
//! - **Unified Error Type**: `SyncError` consolidates all error types
//! - **Error Context**: operation, thread and background flag attached to errors
//! - **Result Type Alias**: `SyncResult<T>` for consistent return types
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection refused, timeout | Yes |
//! | Server | Non-success status, `ok: false`, bad payload | Yes |
//! | Auth | Session denied (401 on chat) | No |
//! | Client | Invalid local state | No |
//! | User | Invalid input | No |
//! | Storage | Local persistence failed | No |

mod auth;
mod category;
mod context;
mod network;
mod result;
mod storage;
mod sync_error;
mod validation;

pub use auth::AuthError;
pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use network::{classify_http_error, NetworkError};
pub use result::{ResultExt, SyncResult};
pub use storage::StorageError;
pub use sync_error::SyncError;
pub use validation::ValidationError;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_error_unification() {
        let errors: Vec<SyncError> = vec![
            NetworkError::Timeout {
                operation: "list_threads".to_string(),
                message: "30s".to_string(),
            }
            .into(),
            AuthError::SessionExpired.into(),
            StorageError::Corrupted {
                key: "chat_history_bob".to_string(),
                message: "eof".to_string(),
            }
            .into(),
            ValidationError::EmptyMessage.into(),
        ];

        let categories: Vec<ErrorCategory> = errors.iter().map(|e| e.category()).collect();
        assert_eq!(
            categories,
            vec![
                ErrorCategory::Network,
                ErrorCategory::Auth,
                ErrorCategory::Storage,
                ErrorCategory::User,
            ]
        );

        for err in &errors {
            assert!(!err.error_code().is_empty());
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_only_session_denial_requires_reauth() {
        let reauth: SyncError = AuthError::SessionExpired.into();
        assert!(reauth.with_context(ErrorContext::new("chat")).requires_reauth());

        let others: Vec<SyncError> = vec![
            NetworkError::HttpStatus {
                status: 403,
                message: "Forbidden".to_string(),
            }
            .into(),
            NetworkError::HttpStatus {
                status: 500,
                message: "Server Error".to_string(),
            }
            .into(),
            StorageError::Unavailable("readonly".to_string()).into(),
        ];
        for err in others {
            assert!(!err.requires_reauth(), "{:?} should not require reauth", err);
        }
    }
}
