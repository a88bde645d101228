use anyhow::{Context, Result};
use clap::Parser;
use job_crawler::cli::{handle_command, CrawlerCli};
use job_crawler::EnvironmentConfig;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CrawlerCli::parse();

    let config = EnvironmentConfig::load()?;
    config.ensure_directories().await?;

    init_logging(&config.log_path)?;

    info!("Configuration loaded for environment: {}", config.environment);
    if config.database_path_overridden {
        info!("DATABASE_PATH override in effect");
    }
    info!("Database: {}", config.database_path.display());
    info!("Source: {}", config.crawler.base_url);
    info!(
        "Keywords: {} ({} pages each, {} ms between pages)",
        config.crawler.keywords.join(", "),
        config.crawler.pages_per_keyword,
        config.crawler.page_delay_ms
    );

    handle_command(cli, &config).await
}

fn init_logging(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    Ok(())
}
