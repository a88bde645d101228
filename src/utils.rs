// src/utils.rs
use anyhow::{Context, Result};
use std::path::Path;

const PLACEHOLDER_EMAIL_DOMAIN: &str = "example.com";

/// Collapse all whitespace runs (including newlines) into single spaces
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Placeholder contact address derived from a company name
pub fn placeholder_email(company_name: &str) -> String {
    let local: String = company_name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("{}@{}", local, PLACEHOLDER_EMAIL_DOMAIN)
}

/// Display name of the placeholder recruiter created for a company
pub fn placeholder_recruiter_name(company_name: &str) -> String {
    format!("{} 담당자", company_name)
}

/// Ensure directory exists
pub async fn ensure_directory(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}
