//! `screenmerch-print`: normalize captured frames into print-ready PNGs.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use screenmerch_print_lib::config::{Args, CliConfig};
use screenmerch_print_lib::services::batch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first: it may carry RUST_LOG and the SCREENMERCH_* settings.
    let dotenv = screenmerch_print_lib::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match &dotenv {
        Some(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        None => tracing::info!("No .env file found, using system environment variables"),
    }

    let config = CliConfig::from(Args::parse());
    tracing::debug!(?config, "Resolved configuration");

    let report = batch::run_batch(&config).await?;
    let manifest = batch::write_manifest(&config, &report).await?;
    tracing::info!(path = %manifest.display(), "Manifest written");

    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} print jobs failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}
