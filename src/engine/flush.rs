//! Background flush of the active thread and the per-thread in-flight guard.

use std::sync::PoisonError;

use tracing::debug;

use super::SyncEngine;
use crate::context::UserContext;
use crate::error::{ErrorContext, ResultExt, SyncResult};

/// What one flush did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// No active thread, or nothing cached for it
    Idle,
    /// Another sync of the thread was still running
    InFlight { thread_id: String },
    /// The cache was pushed and replaced by the server's merge
    Flushed { thread_id: String, messages: usize },
}

/// Marks a thread as having a sync in flight until dropped.
pub(crate) struct FlightGuard<'a> {
    engine: &'a SyncEngine,
    thread_id: String,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .engine
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = in_flight.get_mut(&self.thread_id) {
            *count -= 1;
            if *count == 0 {
                in_flight.remove(&self.thread_id);
            }
        }
    }
}

impl SyncEngine {
    /// Register a sync of `thread_id`, whether or not one is already running.
    pub(crate) fn track(&self, thread_id: &str) -> FlightGuard<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight.entry(thread_id.to_string()).or_insert(0) += 1;
        FlightGuard {
            engine: self,
            thread_id: thread_id.to_string(),
        }
    }

    /// Register a sync of `thread_id` only if none is running.
    fn try_track(&self, thread_id: &str) -> Option<FlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.contains_key(thread_id) {
            return None;
        }
        in_flight.insert(thread_id.to_string(), 1);
        Some(FlightGuard {
            engine: self,
            thread_id: thread_id.to_string(),
        })
    }

    /// True while any sync of `thread_id` is running.
    pub fn is_in_flight(&self, thread_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(thread_id)
    }

    /// Push the active thread's cached messages and adopt the server's merge.
    ///
    /// One scheduler tick. Errors carry a background context; the caller is
    /// expected to log them and wait for the next tick.
    pub async fn flush_active(&self, ctx: &UserContext) -> SyncResult<FlushOutcome> {
        let Some(thread_id) = self.pointer.get(&ctx.user) else {
            return Ok(FlushOutcome::Idle);
        };

        let local = self.cache.read_thread(&ctx.user, &thread_id);
        if local.is_empty() {
            return Ok(FlushOutcome::Idle);
        }

        let Some(_flight) = self.try_track(&thread_id) else {
            debug!(thread_id = %thread_id, "Sync already in flight, skipping flush");
            return Ok(FlushOutcome::InFlight { thread_id });
        };

        let thread = self
            .api
            .sync_thread(ctx, &thread_id, &local)
            .await
            .context(
                ErrorContext::new("flush")
                    .with_thread_id(&thread_id)
                    .in_background(),
            )?;

        self.cache.write_thread(&ctx.user, &thread_id, &thread.messages);
        debug!(thread_id = %thread_id, messages = thread.messages.len(), "Flushed thread");
        Ok(FlushOutcome::Flushed {
            thread_id,
            messages: thread.messages.len(),
        })
    }
}
