//! Authentication-related error types.

use std::fmt;

/// Authentication-specific error variants.
///
/// Only the chat endpoint distinguishes authorization failure; every variant
/// here ends the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server denied the session (HTTP 401 on chat).
    SessionExpired,

    /// No user is logged in, so there is no context to act for.
    NotLoggedIn,
}

impl AuthError {
    /// Check if this error requires a fresh login.
    pub fn requires_reauth(&self) -> bool {
        true
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::SessionExpired => "Session expired. Please log in again.".to_string(),
            AuthError::NotLoggedIn => "You are not logged in.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::SessionExpired => "E_AUTH_EXPIRED",
            AuthError::NotLoggedIn => "E_AUTH_NONE",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::SessionExpired => write!(f, "Session expired (401)"),
            AuthError::NotLoggedIn => write!(f, "User not identified"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_require_reauth() {
        assert!(AuthError::SessionExpired.requires_reauth());
        assert!(AuthError::NotLoggedIn.requires_reauth());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::SessionExpired.error_code(), "E_AUTH_EXPIRED");
        assert_eq!(AuthError::NotLoggedIn.error_code(), "E_AUTH_NONE");
    }

    #[test]
    fn test_display() {
        assert_eq!(AuthError::SessionExpired.to_string(), "Session expired (401)");
        assert_eq!(AuthError::NotLoggedIn.to_string(), "User not identified");
    }
}
