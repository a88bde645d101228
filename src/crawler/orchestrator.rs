// src/crawler/orchestrator.rs
use anyhow::Result;
use chrono::Local;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::normalizer::FieldNormalizer;
use super::saramin::{ListingParser, PageSource};
use super::types::{KeywordReport, RunReport, UpsertOutcome};
use super::upsert::PostingUpserter;
use crate::environment::CrawlerConfig;

/// Walks every configured keyword page by page, one fetch at a time.
///
/// Failures never escape a run: a failed fetch ends that keyword, a broken
/// listing or a rejected write costs only that record.
pub struct CrawlOrchestrator<'a, S: PageSource> {
    source: S,
    parser: ListingParser,
    normalizer: FieldNormalizer,
    upserter: PostingUpserter<'a>,
    config: CrawlerConfig,
}

impl<'a, S: PageSource> CrawlOrchestrator<'a, S> {
    pub fn new(source: S, pool: &'a SqlitePool, config: CrawlerConfig) -> Result<Self> {
        Ok(Self {
            source,
            parser: ListingParser::new(&config.base_url)?,
            normalizer: FieldNormalizer::new(config.tech_vocabulary.as_slice()),
            upserter: PostingUpserter::new(pool, config.auto_approve),
            config,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run(&self) -> RunReport {
        info!(
            "Starting crawl: {} keywords x {} pages",
            self.config.keywords.len(),
            self.config.pages_per_keyword
        );

        let mut pacer = Pacer::new(self.config.page_delay());
        let mut report = RunReport::default();

        for keyword in &self.config.keywords {
            info!("Crawling jobs for keyword: {}", keyword);
            let keyword_report = self.crawl_keyword(keyword, &mut pacer).await;
            info!(
                "Keyword '{}' done: {} created, {} duplicates, {} parse errors, {} failed",
                keyword,
                keyword_report.created,
                keyword_report.duplicates,
                keyword_report.parse_errors,
                keyword_report.failed
            );
            report.keywords.push(keyword_report);
        }

        info!(
            "Crawling and saving completed: {} created, {} duplicates",
            report.total_created(),
            report.total_duplicates()
        );
        report
    }

    async fn crawl_keyword(&self, keyword: &str, pacer: &mut Pacer) -> KeywordReport {
        let mut report = KeywordReport::new(keyword);

        for page in 1..=self.config.pages_per_keyword {
            pacer.wait().await;

            let html = match self.source.fetch_page(keyword, page).await {
                Ok(html) => html,
                Err(e) => {
                    error!("Error fetching page {} for '{}': {:#}", page, keyword, e);
                    report.fetch_error = Some(format!("page {}: {:#}", page, e));
                    break;
                }
            };
            report.pages_fetched += 1;

            self.process_page(&html, &mut report).await;
            info!("Page {} for '{}' crawled", page, keyword);
        }

        report
    }

    async fn process_page(&self, html: &str, report: &mut KeywordReport) {
        let listings = self.parser.parse_page(html);
        if listings.is_empty() {
            warn!("No listings found on page for '{}'", report.keyword);
        }

        let today = Local::now().date_naive();

        for listing in listings {
            let raw = match listing {
                Ok(raw) => raw,
                Err(e) => {
                    error!("Error parsing job posting: {}", e);
                    report.parse_errors += 1;
                    continue;
                }
            };
            report.listings += 1;

            let record = self.normalizer.normalize(raw, today);
            match self.upserter.upsert_posting(&record).await {
                Ok(UpsertOutcome::Created {
                    status_recorded, ..
                }) => {
                    report.created += 1;
                    if !status_recorded {
                        report.status_failures += 1;
                    }
                }
                Ok(UpsertOutcome::Skipped) => report.duplicates += 1,
                Err(e) => {
                    error!("Error saving job '{}' to DB: {:#}", record.url, e);
                    report.failed += 1;
                }
            }
        }
    }
}

/// Enforces a fixed gap between consecutive page fetches.
struct Pacer {
    delay: Duration,
    last_fetch: Option<Instant>,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_fetch: None,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_fetch {
            tokio::time::sleep_until(last + self.delay).await;
        }
        self.last_fetch = Some(Instant::now());
    }
}
