//! Concrete implementations of the trait seams.
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileStore`] - one-file-per-key local storage
//!
//! The [`mock`] submodule provides in-memory doubles used by tests and by
//! the CLI's demo mode.

pub mod file_store;
pub mod mock;
pub mod reqwest_http;

pub use file_store::{FileStore, DEFAULT_DATA_DIR};
pub use mock::{InMemoryStore, InMemoryThreadServer, MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
