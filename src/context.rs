//! Explicit user context and the login/logout lifecycle.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::error::{AuthError, SyncResult, ValidationError};
use crate::session::SessionIdentityProvider;

/// Who an engine operation acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user: String,
    pub session_id: String,
}

impl UserContext {
    pub fn new(user: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            session_id: session_id.into(),
        }
    }
}

/// Owns the current login.
///
/// Logging out drops the session id but leaves the user's cache and active
/// thread pointer in storage; they are picked up again on the next login.
pub struct SessionController {
    sessions: Arc<SessionIdentityProvider>,
    current: Mutex<Option<UserContext>>,
}

impl SessionController {
    pub fn new(sessions: Arc<SessionIdentityProvider>) -> Self {
        Self {
            sessions,
            current: Mutex::new(None),
        }
    }

    /// Start a session for `user`, replacing any current one.
    pub fn login(&self, user: &str) -> SyncResult<UserContext> {
        let user = user.trim();
        if user.is_empty() {
            return Err(ValidationError::EmptyUser.into());
        }

        let ctx = UserContext::new(user, self.sessions.get_session_id(user));
        *self.lock() = Some(ctx.clone());
        info!(user = %ctx.user, "Logged in");
        Ok(ctx)
    }

    /// End the current session, if any.
    pub fn logout(&self) -> Option<UserContext> {
        let previous = self.lock().take();
        if let Some(ref ctx) = previous {
            self.sessions.clear(&ctx.user);
            info!(user = %ctx.user, "Logged out");
        }
        previous
    }

    /// The logged-in context.
    pub fn current(&self) -> SyncResult<UserContext> {
        self.lock()
            .clone()
            .ok_or_else(|| AuthError::NotLoggedIn.into())
    }

    pub fn is_logged_in(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<UserContext>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
