//! Thread API: the server contract the sync engine talks to.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list   | `GET /api/threads?username=U` |
//! | create | `POST /api/threads {username, title}` |
//! | get    | `GET /api/threads/{id}?username=U` |
//! | sync   | `POST /api/threads/{id}/sync?username=U {username, session_id, messages}` |
//! | rename | `PATCH /api/threads/{id}?username=U {username, title}` |
//! | delete | `DELETE /api/threads/{id}?username=U` |
//! | chat   | `POST /api/chat {username, query, thread_id, session_id}` |
//!
//! Every response is an `{ ok, ... }` envelope; `ok: false` and non-2xx
//! statuses are rejections.

mod client;

pub use client::ThreadApiClient;

use async_trait::async_trait;

use crate::context::UserContext;
use crate::error::SyncResult;
use crate::models::{ChatReply, Message, Thread, ThreadSummary};

/// Server operations on a user's threads.
#[async_trait]
pub trait ThreadApi: Send + Sync {
    /// Summaries of every thread, most recently updated first.
    async fn list_threads(&self, ctx: &UserContext) -> SyncResult<Vec<ThreadSummary>>;

    async fn create_thread(&self, ctx: &UserContext, title: &str) -> SyncResult<Thread>;

    async fn get_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<Thread>;

    /// Merge `messages` into the server copy and return the canonical thread.
    async fn sync_thread(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        messages: &[Message],
    ) -> SyncResult<Thread>;

    async fn rename_thread(&self, ctx: &UserContext, thread_id: &str, title: &str)
        -> SyncResult<()>;

    async fn delete_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<()>;

    /// Send one user message. `None` lets the server pick or create the thread.
    async fn chat(
        &self,
        ctx: &UserContext,
        query: &str,
        thread_id: Option<&str>,
    ) -> SyncResult<ChatReply>;
}
