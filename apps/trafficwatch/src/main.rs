mod app;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // The dashboard owns the terminal; default to warnings only, on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = cli::Cli::parse();
    let config_path = trafficwatch_config::resolve_config_path(cli.config.clone());
    let mut config = trafficwatch_config::load_config_or_default(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    app::run(config).await
}
