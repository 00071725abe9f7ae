use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studentdesk::cli::{run_command, Cli};
use studentdesk::config::Config;
use studentdesk::notify::ConsoleNotifier;
use studentdesk::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(api = %config.api.base_url, "Starting studentdesk v{}", env!("CARGO_PKG_VERSION"));

    let app = Arc::new(
        AppState::new(config, Arc::new(ConsoleNotifier)).context("Failed to create HTTP client")?,
    );
    app.restore_session().await;

    run_command(&cli, app).await
}
