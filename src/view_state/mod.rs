//! View state for the rendering layer.
//!
//! Plain data derived from engine output; nothing here talks to storage or
//! the network directly.

mod thread_list;

pub use thread_list::{ThreadListController, ThreadListView, ThreadRow};
