//! In-memory key-value store.
//!
//! Used for tests and as the fallback when no data directory can be opened.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

/// In-memory [`KeyValueStore`] with switchable failure modes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<Mutex<bool>>,
    write_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// Make `set` and `remove` fail with [`StorageError::Io`].
    pub fn set_write_should_fail(&self, should_fail: bool) {
        *self.write_should_fail.lock().unwrap() = should_fail;
    }

    /// Snapshot of every stored key.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if *self.unavailable.lock().unwrap() {
            return Err(StorageError::Unavailable("in-memory store disabled".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        self.check_available()?;
        if *self.write_should_fail.lock().unwrap() {
            return Err(StorageError::Io("simulated write failure".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
