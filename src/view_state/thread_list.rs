//! Thread list view state
//!
//! Pure derivation of the sidebar rows from server summaries, plus the
//! controller that turns row actions into engine calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::context::UserContext;
use crate::engine::{OpenedThread, SyncEngine};
use crate::error::SyncResult;
use crate::models::{ThreadSummary, PLACEHOLDER_TITLE};

/// One row of the thread list
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadRow {
    pub id: String,
    /// Server title, or the placeholder when empty
    pub title: String,
    /// `lastTs`, else `updatedAt`
    pub timestamp: Option<DateTime<Utc>>,
    pub preview: String,
    pub selected: bool,
}

/// Thread list view state for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadListView {
    pub rows: Vec<ThreadRow>,
}

impl ThreadListView {
    /// Derive rows, most recently updated first, marking `active` as selected.
    pub fn derive(summaries: &[ThreadSummary], active: Option<&str>) -> Self {
        let mut sorted: Vec<&ThreadSummary> = summaries.iter().collect();
        // Stable sort keeps the server's order among equal timestamps
        sorted.sort_by(|a, b| b.recency().cmp(&a.recency()));

        let rows = sorted
            .into_iter()
            .map(|s| ThreadRow {
                id: s.id.clone(),
                title: if s.title.trim().is_empty() {
                    PLACEHOLDER_TITLE.to_string()
                } else {
                    s.title.clone()
                },
                timestamp: s.display_ts(),
                preview: s.preview.clone(),
                selected: active == Some(s.id.as_str()),
            })
            .collect();

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The selected row, if any
    pub fn selected(&self) -> Option<&ThreadRow> {
        self.rows.iter().find(|r| r.selected)
    }
}

/// Row actions for the thread list, delegated to the engine
pub struct ThreadListController {
    engine: Arc<SyncEngine>,
}

impl ThreadListController {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }

    /// Fetch the list, re-resolve the active pointer and derive rows.
    pub async fn refresh(&self, ctx: &UserContext) -> SyncResult<ThreadListView> {
        let summaries = self.engine.list_threads(ctx).await?;
        let active = self.engine.resolve_active(ctx, &summaries);
        Ok(ThreadListView::derive(&summaries, active.as_deref()))
    }

    /// Open `thread_id` and return the refreshed list alongside it.
    pub async fn switch(
        &self,
        ctx: &UserContext,
        thread_id: &str,
    ) -> SyncResult<(OpenedThread, ThreadListView)> {
        let opened = self.engine.switch_thread(ctx, thread_id).await;
        let view = self.refresh(ctx).await?;
        Ok((opened, view))
    }

    pub async fn rename(
        &self,
        ctx: &UserContext,
        thread_id: &str,
        title: &str,
    ) -> SyncResult<ThreadListView> {
        self.engine.rename_thread(ctx, thread_id, title).await?;
        self.refresh(ctx).await
    }

    /// Delete a thread. If it was active the most recent remaining thread
    /// takes over.
    pub async fn delete(&self, ctx: &UserContext, thread_id: &str) -> SyncResult<ThreadListView> {
        self.engine.delete_thread(ctx, thread_id).await?;
        self.refresh(ctx).await
    }
}
