use anyhow::Result;

pub mod cli;
pub mod core;
pub mod crawler;
pub mod environment;
pub mod types;
pub mod utils;

pub use crate::core::{Database, JobStore};
pub use crawler::{CrawlOrchestrator, PageSource, RunReport, SaraminClient};
pub use environment::{CrawlerConfig, EnvironmentConfig};

/// Open the store, crawl every configured keyword, and release the store.
///
/// Only a failure to open the store (or to build the HTTP client) is returned
/// as an error; everything that goes wrong during the crawl is in the report.
pub async fn run_crawl(config: &EnvironmentConfig) -> Result<RunReport> {
    let db = Database::new(&config.database_path).await?;
    let result = crawl_with(&db, &config.crawler).await;
    db.close().await;
    result
}

async fn crawl_with(db: &Database, crawler: &CrawlerConfig) -> Result<RunReport> {
    let client = SaraminClient::new(crawler)?;
    let orchestrator = CrawlOrchestrator::new(client, db.pool(), crawler.clone())?;
    Ok(orchestrator.run().await)
}
