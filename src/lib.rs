//! chatsync - offline-tolerant conversation thread sync
//!
//! Keeps a per-user local cache of chat threads and reconciles it with a
//! thread server: local renders first, server data always wins, and unsent
//! messages are flushed in the background.
//!
//! This library exposes modules for use by the CLI and integration tests.

pub mod adapters;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod traits;
pub mod view_state;
