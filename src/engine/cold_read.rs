//! Opening threads: local render first, then push-then-pull reconciliation.

use tracing::{debug, info, warn};

use super::{EngineEvent, RenderSource, SyncEngine};
use crate::context::UserContext;
use crate::error::SyncResult;
use crate::models::{Message, Thread, ThreadSummary, PLACEHOLDER_TITLE};

/// Result of a cold read: what ended up on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedThread {
    pub thread_id: String,
    pub messages: Vec<Message>,
    /// `Local` when the server could not be reached or refused
    pub source: RenderSource,
}

impl SyncEngine {
    fn render(&self, thread_id: Option<&str>, messages: &[Message], source: RenderSource) {
        self.emit(EngineEvent::Rendered {
            thread_id: thread_id.map(str::to_string),
            messages: messages.to_vec(),
            source,
        });
    }

    /// Show a thread, pushing unsent local messages before fetching the
    /// canonical copy.
    ///
    /// Never fails: if the server is unavailable the local render stays and
    /// the cache is left as it was.
    pub async fn open_thread(&self, ctx: &UserContext, thread_id: &str) -> OpenedThread {
        let local = self.cache.read_thread(&ctx.user, thread_id);
        self.render(Some(thread_id), &local, RenderSource::Local);

        match self.reconcile(ctx, thread_id, &local).await {
            Ok(thread) => {
                self.render(Some(thread_id), &thread.messages, RenderSource::Server);
                debug!(thread_id = %thread_id, messages = thread.messages.len(), "Opened thread");
                OpenedThread {
                    thread_id: thread_id.to_string(),
                    messages: thread.messages,
                    source: RenderSource::Server,
                }
            }
            Err(e) => {
                warn!(
                    thread_id = %thread_id,
                    error = %e,
                    code = e.error_code(),
                    "Cold read failed, keeping local messages"
                );
                OpenedThread {
                    thread_id: thread_id.to_string(),
                    messages: local,
                    source: RenderSource::Local,
                }
            }
        }
    }

    async fn reconcile(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        local: &[Message],
    ) -> SyncResult<Thread> {
        if !local.is_empty() {
            self.sync_thread(ctx, thread_id, local).await?;
        }
        self.get_thread(ctx, thread_id).await
    }

    /// Make `thread_id` active, then open it.
    pub async fn switch_thread(&self, ctx: &UserContext, thread_id: &str) -> OpenedThread {
        self.pointer.set(&ctx.user, Some(thread_id));
        info!(user = %ctx.user, thread_id = %thread_id, "Switched thread");
        self.open_thread(ctx, thread_id).await
    }

    /// Start an empty conversation and show it.
    pub async fn new_thread(&self, ctx: &UserContext) -> SyncResult<Thread> {
        let thread = self.create_thread(ctx, PLACEHOLDER_TITLE).await?;
        self.render(Some(&thread.id), &[], RenderSource::Local);
        Ok(thread)
    }

    /// Point at a thread that still exists.
    ///
    /// The current pointer survives if `summaries` lists it; otherwise the
    /// first (most recent) summary takes over, or nothing when the list is
    /// empty. Returns the resulting pointer.
    pub fn resolve_active(&self, ctx: &UserContext, summaries: &[ThreadSummary]) -> Option<String> {
        let current = self.pointer.get(&ctx.user);
        if let Some(ref id) = current {
            if summaries.iter().any(|s| &s.id == id) {
                return current;
            }
        }

        let fallback = summaries.first().map(|s| s.id.clone());
        self.pointer.set(&ctx.user, fallback.as_deref());
        if fallback.is_none() {
            self.render(None, &[], RenderSource::Local);
        }
        debug!(user = %ctx.user, active = ?fallback, "Resolved active thread");
        fallback
    }
}
