//! Command-line interface.
//!
//! ```ignore
//! use chatsync::cli::{parse_args, run_cli_command};
//!
//! let args = parse_args(std::env::args());
//! run_cli_command(args, &SyncConfig::from_env()).await?;
//! ```

pub mod args;
mod commands;
pub mod version;

pub use args::{parse_args, CliArgs, CliCommand, USAGE};
pub use commands::{run_cli_command, Services};
pub use version::{version_string, VERSION};
