//! Test doubles for the trait seams.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`InMemoryStore`] - key-value store with failure modes
//! - [`InMemoryThreadServer`] - [`ThreadApi`](crate::api::ThreadApi) with the backend's merge rules

pub mod http;
pub mod server;
pub mod store;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use server::InMemoryThreadServer;
pub use store::InMemoryStore;
