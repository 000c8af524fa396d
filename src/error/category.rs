//! Error category classification for unified error handling.
//!
//! Categories drive the two decisions the sync engine has to make about a
//! failure: whether the next scheduled flush may retry it, and whether it is
//! shown to the user or only logged.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection refused, timeouts and other transport failures.
    /// Transient; retried by the next scheduled flush.
    Network,

    /// The server rejected the request (non-success status or `ok: false`)
    /// or answered with a payload we could not understand.
    Server,

    /// The server denied the session. Terminal: a fresh login is required.
    Auth,

    /// Programming errors or invalid local state.
    Client,

    /// Invalid user input (empty title, blank message).
    User,

    /// Local persistence failures (unavailable or corrupted storage).
    Storage,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::Storage => "storage",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Auth => "Session expired",
            ErrorCategory::Client => "Application error",
            ErrorCategory::User => "Invalid input",
            ErrorCategory::Storage => "Local storage problem",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => {
                "Check that the backend is running and reachable, then try again"
            }
            ErrorCategory::Server => "The server refused the request. Please try again later",
            ErrorCategory::Auth => "Please log in again",
            ErrorCategory::Client => {
                "This may be a bug. Please report this issue if it persists"
            }
            ErrorCategory::User => "Please check your input and try again",
            ErrorCategory::Storage => "Check permissions and free space of the data directory",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Client.is_retryable());
        assert!(!ErrorCategory::User.is_retryable());
        assert!(!ErrorCategory::Storage.is_retryable());
    }

    #[test]
    fn test_category_as_str() {
        assert_eq!(ErrorCategory::Network.as_str(), "network");
        assert_eq!(ErrorCategory::Server.as_str(), "server");
        assert_eq!(ErrorCategory::Auth.as_str(), "auth");
        assert_eq!(ErrorCategory::Client.as_str(), "client");
        assert_eq!(ErrorCategory::User.as_str(), "user");
        assert_eq!(ErrorCategory::Storage.as_str(), "storage");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", ErrorCategory::Storage), "storage");
    }

    #[test]
    fn test_every_category_has_hint() {
        for category in [
            ErrorCategory::Network,
            ErrorCategory::Server,
            ErrorCategory::Auth,
            ErrorCategory::Client,
            ErrorCategory::User,
            ErrorCategory::Storage,
        ] {
            assert!(!category.recovery_hint().is_empty());
            assert!(!category.description().is_empty());
        }
    }
}
