//! Sync engine: reconciles the local thread cache with the server.
//!
//! Every operation takes an explicit [`UserContext`]. Server data always
//! replaces the cache; the cache only fills the gap until the server answers.

mod cold_read;
mod events;
mod flush;
mod send;

pub use cold_read::OpenedThread;
pub use events::{EngineEvent, RenderSource};
pub use flush::FlushOutcome;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::ThreadApi;
use crate::cache::{ActiveThreadPointer, ThreadCache};
use crate::context::UserContext;
use crate::error::{ErrorContext, ResultExt, SyncResult, ValidationError};
use crate::models::{Message, Thread, ThreadSummary};
use crate::traits::KeyValueStore;

/// Client-side sync engine for one process.
pub struct SyncEngine {
    api: Arc<dyn ThreadApi>,
    cache: Arc<ThreadCache>,
    pointer: Arc<ActiveThreadPointer>,
    events: Option<mpsc::UnboundedSender<EngineEvent>>,
    /// Syncs currently running, per thread id
    in_flight: Mutex<HashMap<String, usize>>,
}

impl SyncEngine {
    /// Create an engine persisting its cache and pointer into `store`.
    pub fn new(api: Arc<dyn ThreadApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_parts(
            api,
            Arc::new(ThreadCache::new(Arc::clone(&store))),
            Arc::new(ActiveThreadPointer::new(store)),
        )
    }

    pub fn with_parts(
        api: Arc<dyn ThreadApi>,
        cache: Arc<ThreadCache>,
        pointer: Arc<ActiveThreadPointer>,
    ) -> Self {
        Self {
            api,
            cache,
            pointer,
            events: None,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Publish renders and list refreshes on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn cache(&self) -> &ThreadCache {
        &self.cache
    }

    pub fn pointer(&self) -> &ActiveThreadPointer {
        &self.pointer
    }

    /// Thread currently shown to `ctx.user`.
    pub fn active_thread(&self, ctx: &UserContext) -> Option<String> {
        self.pointer.get(&ctx.user)
    }

    pub(crate) fn emit(&self, event: EngineEvent) {
        if let Some(ref tx) = self.events {
            // A closed receiver only means nobody is rendering any more
            let _ = tx.send(event);
        }
    }

    /// All threads, most recently updated first.
    ///
    /// Always asks the server; there is no cache fallback.
    pub async fn list_threads(&self, ctx: &UserContext) -> SyncResult<Vec<ThreadSummary>> {
        let mut threads = self
            .api
            .list_threads(ctx)
            .await
            .context(ErrorContext::new("list_threads"))?;
        threads.sort_by(|a, b| b.recency().cmp(&a.recency()));

        debug!(user = %ctx.user, count = threads.len(), "Listed threads");
        self.emit(EngineEvent::ThreadsChanged(threads.clone()));
        Ok(threads)
    }

    /// Create a thread and make it the active one.
    pub async fn create_thread(&self, ctx: &UserContext, title: &str) -> SyncResult<Thread> {
        let thread = self
            .api
            .create_thread(ctx, title)
            .await
            .context(ErrorContext::new("create_thread"))?;

        self.pointer.set(&ctx.user, Some(&thread.id));
        self.cache.write_thread(&ctx.user, &thread.id, &thread.messages);
        info!(user = %ctx.user, thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    /// Fetch a thread and overwrite its cache entry with the result.
    pub async fn get_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<Thread> {
        let thread = self
            .api
            .get_thread(ctx, thread_id)
            .await
            .context(ErrorContext::new("get_thread").with_thread_id(thread_id))?;

        self.cache.write_thread(&ctx.user, thread_id, &thread.messages);
        Ok(thread)
    }

    /// Rename a thread. The message cache is untouched.
    pub async fn rename_thread(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        title: &str,
    ) -> SyncResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        self.api
            .rename_thread(ctx, thread_id, title)
            .await
            .context(ErrorContext::new("rename_thread").with_thread_id(thread_id))?;
        info!(user = %ctx.user, thread_id = %thread_id, "Renamed thread");
        Ok(())
    }

    /// Delete a thread, its cache entry and, if it was active, the pointer.
    pub async fn delete_thread(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<()> {
        self.api
            .delete_thread(ctx, thread_id)
            .await
            .context(ErrorContext::new("delete_thread").with_thread_id(thread_id))?;

        self.cache.delete_thread(&ctx.user, thread_id);
        if self.pointer.get(&ctx.user).as_deref() == Some(thread_id) {
            self.pointer.clear(&ctx.user);
        }
        info!(user = %ctx.user, thread_id = %thread_id, "Deleted thread");
        Ok(())
    }

    /// Push `local` to the server and replace the cache entry with the merge.
    pub async fn sync_thread(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        local: &[Message],
    ) -> SyncResult<Thread> {
        let _flight = self.track(thread_id);
        let thread = self
            .api
            .sync_thread(ctx, thread_id, local)
            .await
            .context(ErrorContext::new("sync_thread").with_thread_id(thread_id))?;

        self.cache.write_thread(&ctx.user, thread_id, &thread.messages);
        debug!(
            thread_id = %thread_id,
            pushed = local.len(),
            canonical = thread.messages.len(),
            "Synced thread"
        );
        Ok(thread)
    }
}
