//! Markov Attribution

use anyhow::Context;
use clap::Parser;
use markov_attribution::{Config, VERSION, cli, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)
            .with_context(|| format!("Could not load config {}", config_path.display()))?,
        None => Config::load().context("Could not load config from default locations")?,
    };

    // CLI flag wins over config; RUST_LOG wins over both
    init_logging(args.log_level.as_deref().unwrap_or(&config.logging.level));

    tracing::info!("Markov Attribution v{}", VERSION);
    tracing::debug!("Parsed arguments: {:?}", args);
    tracing::debug!("Loaded configuration: {:?}", config);

    cli::execute(args, config).await?;

    Ok(())
}
