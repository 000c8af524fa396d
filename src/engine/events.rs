//! What the engine tells the rendering layer.

use crate::models::{Message, ThreadSummary};

/// Where a rendered message list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSource {
    /// Local cache, possibly ahead of or behind the server
    Local,
    /// Canonical server copy
    Server,
}

/// Notifications published on the engine's event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Show these messages for a thread. `thread_id: None` is the empty state.
    Rendered {
        thread_id: Option<String>,
        messages: Vec<Message>,
        source: RenderSource,
    },
    /// A fresh thread list arrived from the server.
    ThreadsChanged(Vec<ThreadSummary>),
    /// The server denied the session; the user has to log in again.
    ReauthRequired,
}
