//! Key-value persistence trait abstraction.
//!
//! Models a browser-style local store: string keys, string values, no
//! transactions. Callers do their own read-modify-write serialization.

use crate::error::StorageError;

/// Trait for local string storage.
///
/// Implementations include [`FileStore`](crate::adapters::FileStore) for the
/// CLI and [`InMemoryStore`](crate::adapters::InMemoryStore) for tests and
/// ephemeral sessions.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
