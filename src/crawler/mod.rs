// src/crawler/mod.rs
//! Search-page crawl and the normalize/resolve/upsert pipeline behind it

pub mod normalizer;
pub mod orchestrator;
pub mod resolver;
pub mod saramin;
pub mod types;
pub mod upsert;

#[cfg(test)]
pub(crate) mod testing;

pub use normalizer::{parse_deadline, FieldNormalizer};
pub use orchestrator::CrawlOrchestrator;
pub use resolver::EntityResolver;
pub use saramin::{ListingParser, PageSource, SaraminClient};
pub use types::{KeywordReport, ListingError, RawListing, RunReport, ScrapedRecord, UpsertOutcome};
pub use upsert::PostingUpserter;
