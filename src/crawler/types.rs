// src/crawler/types.rs
use chrono::NaiveDate;
use thiserror::Error;

/// Fields as they were found on a search-results page. Only the link is
/// mandatory; everything else may be absent from the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub company_name: Option<String>,
    pub title: Option<String>,
    pub url: String,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub employment_type: Option<String>,
    pub category: Option<String>,
    pub salary: Option<String>,
    pub deadline_text: Option<String>,
}

/// A listing after normalization. Every text column carries either the
/// scraped value or its fallback label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedRecord {
    pub company_name: String,
    pub title: String,
    pub url: String,
    pub location: String,
    pub experience: String,
    pub education: String,
    pub employment_type: String,
    /// `None` when the listing had no category text; no category is assigned then.
    pub category: Option<String>,
    pub salary: String,
    pub deadline_text: String,
    pub deadline: Option<NaiveDate>,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("listing has no job link")]
    MissingLink,

    #[error("invalid job link '{href}': {reason}")]
    InvalidLink { href: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created {
        posting_id: String,
        /// False when the companion status row could not be written.
        status_recorded: bool,
    },
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordReport {
    pub keyword: String,
    pub pages_fetched: u32,
    pub listings: u32,
    pub parse_errors: u32,
    pub created: u32,
    pub duplicates: u32,
    pub failed: u32,
    pub status_failures: u32,
    pub fetch_error: Option<String>,
}

impl KeywordReport {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub keywords: Vec<KeywordReport>,
}

impl RunReport {
    pub fn total_created(&self) -> u32 {
        self.keywords.iter().map(|k| k.created).sum()
    }

    pub fn total_duplicates(&self) -> u32 {
        self.keywords.iter().map(|k| k.duplicates).sum()
    }

    pub fn total_parse_errors(&self) -> u32 {
        self.keywords.iter().map(|k| k.parse_errors).sum()
    }

    pub fn total_failed(&self) -> u32 {
        self.keywords.iter().map(|k| k.failed).sum()
    }

    pub fn failed_keywords(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .filter(|k| k.fetch_error.is_some())
            .map(|k| k.keyword.as_str())
            .collect()
    }
}

impl ScrapedRecord {
    /// Category text for display, with the fallback label when none was scraped
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .unwrap_or(super::normalizer::UNKNOWN_CATEGORY)
    }
}
