//! Per-user session identifiers.
//!
//! A session id is a UUID v4 created the first time a user is seen and then
//! reused until logout. When the store cannot be used the id lives in memory
//! for the rest of the process, which still keeps it stable across calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::traits::KeyValueStore;

/// Storage key holding `user`'s session id.
pub fn session_key(user: &str) -> String {
    format!("session_id_{}", user)
}

/// Issues and remembers session identifiers.
pub struct SessionIdentityProvider {
    store: Arc<dyn KeyValueStore>,
    ephemeral: Mutex<HashMap<String, String>>,
}

impl SessionIdentityProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ephemeral: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session id for `user`, creating and persisting one on first use.
    pub fn get_session_id(&self, user: &str) -> String {
        let mut ephemeral = self
            .ephemeral
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(id) = ephemeral.get(user) {
            return id.clone();
        }

        let key = session_key(user);
        match self.store.get(&key) {
            Ok(Some(id)) if !id.trim().is_empty() => return id,
            Ok(_) => {}
            Err(e) => {
                warn!(user = %user, error = %e, "Session store unreadable, using ephemeral session id");
                let id = Uuid::new_v4().to_string();
                ephemeral.insert(user.to_string(), id.clone());
                return id;
            }
        }

        let id = Uuid::new_v4().to_string();
        if let Err(e) = self.store.set(&key, &id) {
            warn!(user = %user, error = %e, "Could not persist session id, keeping it in memory");
            ephemeral.insert(user.to_string(), id.clone());
        } else {
            debug!(user = %user, "Created session id");
        }
        id
    }

    /// Forget `user`'s session id, both persisted and in-memory.
    pub fn clear(&self, user: &str) {
        self.ephemeral
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user);

        if let Err(e) = self.store.remove(&session_key(user)) {
            warn!(user = %user, error = %e, "Could not remove persisted session id");
        }
    }
}
