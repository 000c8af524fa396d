//! Input validation errors.

use thiserror::Error;

/// Rejected user input, detected locally before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A rename was attempted with a title that is blank after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// A send was attempted with blank text.
    #[error("message must not be empty")]
    EmptyMessage,

    /// Login was attempted with a blank user name.
    #[error("user name must not be empty")]
    EmptyUser,
}

impl ValidationError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::EmptyTitle => "Please enter a title.".to_string(),
            ValidationError::EmptyMessage => "Please type a message first.".to_string(),
            ValidationError::EmptyUser => "Please enter a user name.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "E_VAL_TITLE",
            ValidationError::EmptyMessage => "E_VAL_MESSAGE",
            ValidationError::EmptyUser => "E_VAL_USER",
        }
    }
}
