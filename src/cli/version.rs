//! Version command for the chatsync CLI.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version line printed by `--version`.
pub fn version_string() -> String {
    format!("chatsync {}", VERSION)
}
