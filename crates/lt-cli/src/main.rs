//! logtriage: analyze, search, watch and aggregate log files.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lt_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logtriage starting");

    lt_cli::execute(cli).await
}
