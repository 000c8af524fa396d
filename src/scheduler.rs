//! Periodic background flush of the active thread.
//!
//! A spawned task ticks every [`FLUSH_INTERVAL_SECS`] and pushes the active
//! thread's cached messages. Lifecycle events (the app being hidden or about
//! to be discarded) trigger one extra flush; shutdown runs a final flush
//! bounded by a grace period.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::context::SessionController;
use crate::engine::{FlushOutcome, SyncEngine};

/// Default flush interval (15 seconds).
pub const FLUSH_INTERVAL_SECS: u64 = 15;

/// Application lifecycle transitions the scheduler reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The app went to the background
    Hidden,
    /// The app is about to be discarded
    Discarding,
    /// Flush one last time and stop
    Shutdown,
}

/// Control handle for a running flush scheduler.
pub struct FlushHandle {
    events: mpsc::UnboundedSender<LifecycleEvent>,
    task: JoinHandle<()>,
}

impl FlushHandle {
    /// Forward a lifecycle event. Ignored once the scheduler has stopped.
    pub fn notify(&self, event: LifecycleEvent) {
        let _ = self.events.send(event);
    }

    /// Ask for a final flush and wait at most `grace` for it.
    ///
    /// Returns false if the flush did not finish in time; the task is then
    /// aborted.
    pub async fn shutdown(self, grace: Duration) -> bool {
        let _ = self.events.send(LifecycleEvent::Shutdown);

        let mut task = self.task;
        match tokio::time::timeout(grace, &mut task).await {
            Ok(_) => true,
            Err(_) => {
                tracing::warn!("Final flush did not finish within {:?}", grace);
                task.abort();
                false
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the scheduler with the default interval.
pub fn spawn_flush_scheduler(
    engine: Arc<SyncEngine>,
    session: Arc<SessionController>,
) -> FlushHandle {
    spawn_flush_scheduler_with_interval(
        engine,
        session,
        Duration::from_secs(FLUSH_INTERVAL_SECS),
    )
}

/// Spawn the scheduler with a custom interval.
///
/// The first tick fires one full `period` after start.
pub fn spawn_flush_scheduler_with_interval(
    engine: Arc<SyncEngine>,
    session: Arc<SessionController>,
    period: Duration,
) -> FlushHandle {
    let (events, mut lifecycle_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        tracing::info!("Flush scheduler started (interval: {:?})", period);

        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    flush_once(&engine, &session).await;
                }
                event = lifecycle_rx.recv() => match event {
                    Some(LifecycleEvent::Hidden) | Some(LifecycleEvent::Discarding) => {
                        tracing::debug!("Lifecycle event {:?}, flushing", event);
                        flush_once(&engine, &session).await;
                    }
                    Some(LifecycleEvent::Shutdown) | None => {
                        flush_once(&engine, &session).await;
                        break;
                    }
                },
            }
        }

        tracing::info!("Flush scheduler stopped");
    });

    FlushHandle { events, task }
}

/// One flush for whoever is logged in. Errors are logged and left for the
/// next tick.
async fn flush_once(engine: &SyncEngine, session: &SessionController) {
    let Ok(ctx) = session.current() else {
        return;
    };

    match engine.flush_active(&ctx).await {
        Ok(FlushOutcome::Flushed {
            thread_id,
            messages,
        }) => {
            tracing::debug!(thread_id = %thread_id, messages, "Background flush done");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(
                error = %e,
                code = e.error_code(),
                retryable = e.is_retryable(),
                "Background flush failed"
            );
        }
    }
}
