//! Runtime configuration.
//!
//! Build a [`SyncConfig`] with the builder methods, or read it from the
//! environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `CHATSYNC_BASE_URL` | server base URL |
//! | `CHATSYNC_DATA_DIR` | directory for the local store |
//! | `CHATSYNC_FLUSH_SECS` | background flush interval |
//! | `CHATSYNC_TIMEOUT_SECS` | per-request timeout |
//! | `CHATSYNC_DEMO` | use the in-memory server instead of HTTP |
//!
//! ```ignore
//! let config = SyncConfig::default()
//!     .with_base_url("http://10.0.0.5:8000")
//!     .with_flush_interval(Duration::from_secs(5));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::DEFAULT_DATA_DIR;
use crate::scheduler::FLUSH_INTERVAL_SECS;

/// Server used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Base URL of the thread server
    pub base_url: String,
    /// Local store directory (default: `~/.chatsync`)
    pub data_dir: Option<PathBuf>,
    /// How often the active thread is flushed
    pub flush_interval: Duration,
    pub request_timeout: Duration,
    /// Run against the in-memory server
    pub demo: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: dirs::home_dir().map(|home| home.join(DEFAULT_DATA_DIR)),
            flush_interval: Duration::from_secs(FLUSH_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            demo: false,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    /// Defaults overridden by `CHATSYNC_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injected lookup.
    ///
    /// Unparsable numbers are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CHATSYNC_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(dir) = lookup("CHATSYNC_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config = config.with_data_dir(dir);
        }
        if let Some(secs) = parse_secs(&lookup, "CHATSYNC_FLUSH_SECS") {
            config = config.with_flush_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_secs(&lookup, "CHATSYNC_TIMEOUT_SECS") {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(demo) = lookup("CHATSYNC_DEMO") {
            config = config.with_demo(matches!(demo.as_str(), "1" | "true" | "yes"));
        }

        config
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => {
            tracing::warn!("Ignoring {}={:?}: expected a positive number of seconds", key, raw);
            None
        }
    }
}
