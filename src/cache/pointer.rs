//! Which thread each user is looking at.

use std::sync::Arc;

use tracing::warn;

use crate::traits::KeyValueStore;

/// Storage key holding `user`'s active thread id.
pub fn active_thread_key(user: &str) -> String {
    format!("active_thread_{}", user)
}

/// Persisted, per-user reference to the displayed thread.
pub struct ActiveThreadPointer {
    store: Arc<dyn KeyValueStore>,
}

impl ActiveThreadPointer {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, user: &str) -> Option<String> {
        match self.store.get(&active_thread_key(user)) {
            Ok(Some(id)) if !id.is_empty() => Some(id),
            Ok(_) => None,
            Err(e) => {
                warn!(user = %user, error = %e, "Active thread pointer unreadable");
                None
            }
        }
    }

    /// Point at `thread_id`, or clear the pointer with `None`.
    pub fn set(&self, user: &str, thread_id: Option<&str>) {
        let key = active_thread_key(user);
        let result = match thread_id {
            Some(id) => self.store.set(&key, id),
            None => self.store.remove(&key),
        };
        if let Err(e) = result {
            warn!(user = %user, error = %e, "Could not persist active thread pointer");
        }
    }

    pub fn clear(&self, user: &str) {
        self.set(user, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;

    #[test]
    fn test_set_get_clear() {
        let store = InMemoryStore::new();
        let pointer = ActiveThreadPointer::new(Arc::new(store.clone()));

        assert_eq!(pointer.get("alice"), None);

        pointer.set("alice", Some("t_1"));
        assert_eq!(pointer.get("alice"), Some("t_1".to_string()));
        assert_eq!(store.get("active_thread_alice").unwrap(), Some("t_1".to_string()));

        pointer.clear("alice");
        assert_eq!(pointer.get("alice"), None);
        assert_eq!(store.get("active_thread_alice").unwrap(), None);
    }

    #[test]
    fn test_unavailable_store() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        let pointer = ActiveThreadPointer::new(Arc::new(store));

        pointer.set("alice", Some("t_1"));
        assert_eq!(pointer.get("alice"), None);
    }
}
