//! Common test utilities for integration tests.
//!
//! ```ignore
//! mod common;
//! use common::*;
//!
//! let harness = Harness::new();
//! let reply = harness.engine.send_message(&harness.ctx, "hello").await.unwrap();
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::mpsc;

use chatsync::adapters::{InMemoryStore, InMemoryThreadServer};
use chatsync::context::UserContext;
use chatsync::engine::{EngineEvent, SyncEngine};
use chatsync::models::{Message, MessageRole};
use chatsync::traits::KeyValueStore;

/// Fixed timestamp `2024-05-01T12:00:<secs>Z`.
pub fn at(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, secs).unwrap()
}

pub fn user_msg(content: &str, secs: u32) -> Message {
    Message::new(MessageRole::User, content, at(secs))
}

pub fn bot_msg(content: &str, secs: u32) -> Message {
    Message::new(MessageRole::Assistant, content, at(secs))
}

pub fn test_ctx() -> UserContext {
    UserContext::new("alice", "session-test-1")
}

pub fn contents(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}

/// Engine over the in-memory server and store, with its event stream.
pub struct Harness {
    pub engine: Arc<SyncEngine>,
    pub server: InMemoryThreadServer,
    pub store: InMemoryStore,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
    pub ctx: UserContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_server(InMemoryThreadServer::new())
    }

    pub fn with_server(server: InMemoryThreadServer) -> Self {
        let store = InMemoryStore::new();
        let (tx, events) = mpsc::unbounded_channel();
        let engine = SyncEngine::new(
            Arc::new(server.clone()),
            Arc::new(store.clone()) as Arc<dyn KeyValueStore>,
        )
        .with_events(tx);

        Self {
            engine: Arc::new(engine),
            server,
            store,
            events,
            ctx: test_ctx(),
        }
    }

    /// A second client for the same user, sharing the server but not the cache.
    pub fn second_client(&self) -> Harness {
        let mut other = Harness::with_server(self.server.clone());
        other.ctx = UserContext::new(self.ctx.user.clone(), "session-test-2");
        other
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
