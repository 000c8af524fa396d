//! Error context for enriched error information.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging.
///
/// Records which engine operation failed, on which thread, and when.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Name of the operation that failed (e.g. `sync_thread`).
    pub operation: String,

    /// Thread ID if the error occurred within a specific thread context.
    pub thread_id: Option<String>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Whether the failing call ran in the background (flush, post-send
    /// reconciliation) rather than on behalf of a user action.
    pub background: bool,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            thread_id: None,
            timestamp: Utc::now(),
            background: false,
        }
    }

    /// Set the thread ID for this context.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Mark the context as belonging to background work.
    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref thread_id) = self.thread_id {
            parts.push(format!("thread_id={}", thread_id));
        }

        if self.background {
            parts.push("background=true".to_string());
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref thread_id) = self.thread_id {
            write!(f, " thread={}", thread_id)?;
        }

        if self.background {
            write!(f, " (background)")?;
        }

        Ok(())
    }
}
