// src/crawler/testing.rs
//! Search-page fixtures and an in-process page source for tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::saramin::PageSource;

pub struct Listing<'a> {
    pub company: &'a str,
    pub title: &'a str,
    pub href: Option<&'a str>,
    pub deadline: &'a str,
}

impl<'a> Listing<'a> {
    pub fn new(company: &'a str, title: &'a str, href: Option<&'a str>) -> Self {
        Self {
            company,
            title,
            href,
            deadline: "~ 11/30(월)",
        }
    }
}

/// One `.item_recruit` block shaped like the live search page
pub fn listing_html(listing: &Listing) -> String {
    let href = listing
        .href
        .map(|h| format!(r#" href="{}""#, h))
        .unwrap_or_default();

    format!(
        r#"
        <div class="item_recruit">
          <div class="area_corp">
            <strong class="corp_name"><a href="/zf_user/company-info">{company}</a></strong>
          </div>
          <div class="area_job">
            <h2 class="job_tit"><a{href} title="{title}"><span>{title}</span></a></h2>
            <div class="job_date"><span class="date">{deadline}</span></div>
            <div class="job_condition">
              <span><a>서울</a> <a>강남구</a></span>
              <span>경력 3~5년</span>
              <span>대졸↑</span>
              <span>정규직</span>
            </div>
            <div class="job_sector"><a>웹개발</a>, <a>Node.js</a></div>
            <div class="area_badge"><span class="salary">면접 후 결정</span></div>
          </div>
        </div>"#,
        company = listing.company,
        title = listing.title,
        href = href,
        deadline = listing.deadline,
    )
}

pub fn page_html(listings: &[String]) -> String {
    format!(
        r#"<html><body><div class="content">{}</div></body></html>"#,
        listings.join("\n")
    )
}

/// Serves canned pages; unknown (keyword, page) pairs fail like a network error.
#[derive(Default)]
pub struct FakePageSource {
    pages: HashMap<(String, u32), String>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl FakePageSource {
    pub fn with_page(mut self, keyword: &str, page: u32, html: String) -> Self {
        self.pages.insert((keyword.to_string(), page), html);
        self
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageSource for FakePageSource {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((keyword.to_string(), page));
        }

        self.pages
            .get(&(keyword.to_string(), page))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("connection reset fetching {} page {}", keyword, page))
    }
}
