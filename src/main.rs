use chatsync::cli::{parse_args, run_cli_command};
use chatsync::config::SyncConfig;

use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_env("CHATSYNC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "chatsync=info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let args = parse_args(std::env::args());
    let config = SyncConfig::from_env();
    tracing::debug!(base_url = %config.base_url, demo = config.demo, "Starting chatsync");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_cli_command(args, &config))
}
