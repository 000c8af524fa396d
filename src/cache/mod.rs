//! Local, per-user thread cache.
//!
//! Each user's cache is one JSON object `threadId -> [Message]` stored under
//! `chat_history_{user}`. The cache only accelerates rendering and buffers
//! messages the server has not seen yet; server data always replaces it.

mod pointer;
mod reconciliation;

pub use pointer::{active_thread_key, ActiveThreadPointer};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::models::Message;
use crate::traits::KeyValueStore;

/// Everything cached for one user.
pub(crate) type History = BTreeMap<String, Vec<Message>>;

const TOMBSTONE: &str = "{}";

/// Storage key holding `user`'s message cache.
pub fn history_key(user: &str) -> String {
    format!("chat_history_{}", user)
}

/// Message cache over a [`KeyValueStore`].
///
/// Every read-modify-write runs under one lock that is never held across an
/// await point, so concurrent appends from the same process are not lost.
pub struct ThreadCache {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl ThreadCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Cached messages of a thread, empty if none.
    pub fn read_thread(&self, user: &str, thread_id: &str) -> Vec<Message> {
        let _guard = self.guard();
        self.load(user).remove(thread_id).unwrap_or_default()
    }

    /// Replace a thread's messages.
    pub fn write_thread(&self, user: &str, thread_id: &str, messages: &[Message]) {
        let _guard = self.guard();
        let mut history = self.load(user);
        history.insert(thread_id.to_string(), messages.to_vec());
        self.save(user, &history);
    }

    /// Append one message to a thread, creating the entry if needed.
    pub fn append_message(&self, user: &str, thread_id: &str, message: Message) {
        let _guard = self.guard();
        let mut history = self.load(user);
        history
            .entry(thread_id.to_string())
            .or_default()
            .push(message);
        self.save(user, &history);
    }

    /// Remove a thread's entry. Missing entries are fine.
    pub fn delete_thread(&self, user: &str, thread_id: &str) {
        let _guard = self.guard();
        let mut history = self.load(user);
        if history.remove(thread_id).is_some() {
            self.save(user, &history);
        }
    }

    /// Ids of every cached thread.
    pub fn thread_ids(&self, user: &str) -> Vec<String> {
        let _guard = self.guard();
        self.load(user).into_keys().collect()
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the user's history. Unreadable data counts as empty; corrupt data
    /// is additionally reset so the next read starts clean.
    pub(crate) fn load(&self, user: &str) -> History {
        let key = history_key(user);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return History::new(),
            Err(e) => {
                debug!(user = %user, error = %e, "Cache unreadable, treating as empty");
                return History::new();
            }
        };

        match serde_json::from_str::<History>(&raw) {
            Ok(history) => history,
            Err(e) => {
                let err = StorageError::Corrupted {
                    key: key.clone(),
                    message: e.to_string(),
                };
                warn!(user = %user, error = %err, "Discarding corrupted cache");
                if let Err(e) = self.store.set(&key, TOMBSTONE) {
                    warn!(user = %user, error = %e, "Could not reset corrupted cache");
                }
                History::new()
            }
        }
    }

    pub(crate) fn save(&self, user: &str, history: &History) {
        let raw = match serde_json::to_string(history) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(user = %user, error = %e, "Could not serialize cache");
                return;
            }
        };
        if let Err(e) = self.store.set(&history_key(user), &raw) {
            warn!(user = %user, error = %e, "Could not persist cache");
        }
    }
}
