//! Result type alias for sync operations.

use super::context::ErrorContext;
use super::storage::StorageError;
use super::sync_error::SyncError;

/// Type alias for Results using SyncError.
pub type SyncResult<T> = Result<T, SyncError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// ```ignore
    /// api.get_thread(&ctx, id)
    ///     .await
    ///     .context(ErrorContext::new("get_thread").with_thread_id(id))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> SyncResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> SyncResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T> ResultExt<T> for SyncResult<T> {
    fn context(self, ctx: ErrorContext) -> SyncResult<T> {
        self.map_err(|e| e.with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> SyncResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for Result<T, StorageError> {
    fn context(self, ctx: ErrorContext) -> SyncResult<T> {
        self.map_err(|e| SyncError::from(e).with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> SyncResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| SyncError::from(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    fn timeout() -> SyncError {
        SyncError::Network(NetworkError::Timeout {
            operation: "connect".to_string(),
            message: "30s".to_string(),
        })
    }

    #[test]
    fn test_context_extension() {
        let result: SyncResult<i32> = Err(timeout());

        let err = result
            .context(ErrorContext::new("send_message").with_thread_id("t_1"))
            .unwrap_err();

        let ctx = err.context().unwrap();
        assert_eq!(ctx.operation, "send_message");
        assert_eq!(ctx.thread_id, Some("t_1".to_string()));
    }

    #[test]
    fn test_context_extension_preserves_ok() {
        let result: SyncResult<i32> = Ok(42);
        assert_eq!(result.context(ErrorContext::new("noop")).unwrap(), 42);
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let result: SyncResult<i32> = Ok(42);
        let mut called = false;

        let with_ctx = result.with_context(|| {
            called = true;
            ErrorContext::new("test")
        });

        assert!(with_ctx.is_ok());
        assert!(!called);
    }

    #[test]
    fn test_context_from_storage_error() {
        let result: Result<(), StorageError> = Err(StorageError::Io("disk full".to_string()));

        let err = result.context(ErrorContext::new("write_cache")).unwrap_err();

        assert!(matches!(err.inner(), SyncError::Storage(_)));
        assert_eq!(err.context().unwrap().operation, "write_cache");
    }
}
