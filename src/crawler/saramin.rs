// src/crawler/saramin.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::types::{ListingError, RawListing};
use crate::environment::CrawlerConfig;
use crate::utils::clean_text;

const SEARCH_PATH: &str = "/zf_user/search/recruit";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source of raw search-result pages, one per (keyword, page) pair.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String>;
}

pub struct SaraminClient {
    client: Client,
    base_url: Url,
}

impl SaraminClient {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9"));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.base_url))?;

        Ok(Self { client, base_url })
    }

    pub fn search_url(&self, keyword: &str, page: u32) -> Result<Url> {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .context("Failed to build search URL")?;
        url.query_pairs_mut()
            .append_pair("searchType", "search")
            .append_pair("searchword", keyword)
            .append_pair("recruitPage", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for SaraminClient {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String> {
        let url = self.search_url(keyword, page)?;
        info!("Fetching page {}: {}", page, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch search page")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }
}

/// CSS-selector parser for one search-results page.
pub struct ListingParser {
    base_url: Url,
    item: Selector,
    company: Selector,
    title: Selector,
    conditions: Selector,
    sector: Selector,
    salary: Selector,
    deadline: Selector,
}

impl ListingParser {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)
                .with_context(|| format!("Invalid base URL: {}", base_url))?,
            item: selector(".item_recruit")?,
            company: selector(".corp_name a")?,
            title: selector(".job_tit a")?,
            conditions: selector(".job_condition span")?,
            sector: selector(".job_sector")?,
            salary: selector(".salary, .salary_class_selector")?,
            deadline: selector(".job_date .date")?,
        })
    }

    /// Every listing on the page, each parsed independently so one broken
    /// entry does not hide its siblings.
    pub fn parse_page(&self, html: &str) -> Vec<Result<RawListing, ListingError>> {
        let document = Html::parse_document(html);
        let listings: Vec<_> = document
            .select(&self.item)
            .map(|element| self.parse_listing(element))
            .collect();

        debug!("Found {} listings on page", listings.len());
        listings
    }

    fn parse_listing(&self, element: ElementRef) -> Result<RawListing, ListingError> {
        let title_link = element.select(&self.title).next();

        let href = title_link
            .and_then(|link| link.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(ListingError::MissingLink)?;

        let url = self
            .base_url
            .join(href)
            .map_err(|e| ListingError::InvalidLink {
                href: href.to_string(),
                reason: e.to_string(),
            })?;

        let conditions: Vec<String> = element
            .select(&self.conditions)
            .map(element_text)
            .collect();
        let condition = |index: usize| conditions.get(index).cloned();

        Ok(RawListing {
            company_name: self.text_of(element, &self.company),
            title: title_link.map(element_text),
            url: url.to_string(),
            location: condition(0),
            experience: condition(1),
            education: condition(2),
            employment_type: condition(3),
            category: self.text_of(element, &self.sector),
            salary: self.text_of(element, &self.salary),
            deadline_text: self.text_of(element, &self.deadline),
        })
    }

    fn text_of(&self, element: ElementRef, selector: &Selector) -> Option<String> {
        element.select(selector).next().map(element_text)
    }
}

/// Text of an element with inline markup (keyword highlighting) removed.
fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector '{}': {}", css, e))
}
