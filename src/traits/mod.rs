//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, PATCH, DELETE)
//! - [`KeyValueStore`] - Local string storage for the cache and identity

pub mod http;
pub mod storage;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use storage::KeyValueStore;
