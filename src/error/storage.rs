//! Local persistence error types.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::traits::KeyValueStore).
///
/// None of these are fatal: the cache treats unreadable data as empty and
/// the session provider falls back to an in-memory identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing store cannot be used at all (no data directory, quota).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value exists but cannot be parsed.
    #[error("corrupted value under '{key}': {message}")]
    Corrupted { key: String, message: String },

    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A value could not be serialized for writing.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StorageError::Unavailable(_) => {
                "Local storage is unavailable; changes are kept in memory only.".to_string()
            }
            StorageError::Corrupted { .. } => {
                "Locally cached conversations were unreadable and have been reset.".to_string()
            }
            StorageError::Io(_) | StorageError::Serialization(_) => {
                "Could not save conversations locally.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "E_STORE_UNAVAILABLE",
            StorageError::Corrupted { .. } => "E_STORE_CORRUPT",
            StorageError::Io(_) => "E_STORE_IO",
            StorageError::Serialization(_) => "E_STORE_SER",
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}
