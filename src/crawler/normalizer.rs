// src/crawler/normalizer.rs
//! Turns raw listing text into typed, fully-populated fields

use chrono::{Datelike, Days, NaiveDate};

use super::types::{RawListing, ScrapedRecord};

pub const DEFAULT_TECH_KEYWORDS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "node.js",
    "react",
    "vue",
    "angular",
    "django",
    "flask",
    "spring",
    "mysql",
    "mongodb",
    "docker",
    "typescript",
    "aws",
];

/// Sole entry of the technology set when no keyword matched
pub const NO_TECH_STACK: &str = "N/A";

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_LOCATION: &str = "Location Not Specified";
pub const UNKNOWN_EXPERIENCE: &str = "Experience Not Specified";
pub const UNKNOWN_EDUCATION: &str = "Education Not Specified";
pub const UNKNOWN_EMPLOYMENT_TYPE: &str = "Employment Type Not Specified";
pub const UNKNOWN_CATEGORY: &str = "Category Not Specified";
pub const UNKNOWN_SALARY: &str = "Not Specified";

const CLOSES_TODAY: &str = "오늘마감";
const CLOSES_TOMORROW: &str = "내일마감";
const ROLLING_DEADLINES: &[&str] = &["채용시", "상시채용"];

const DATED_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

pub struct FieldNormalizer {
    vocabulary: Vec<String>,
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TECH_KEYWORDS)
    }
}

impl FieldNormalizer {
    pub fn new<S: AsRef<str>>(vocabulary: &[S]) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(vocabulary.len());
        for keyword in vocabulary {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        Self {
            vocabulary: keywords,
        }
    }

    pub fn normalize(&self, raw: RawListing, today: NaiveDate) -> ScrapedRecord {
        let title = present(raw.title);
        let category = present(raw.category);
        let deadline_text = present(raw.deadline_text).unwrap_or_default();

        let tech_stack = self.tech_stack(
            title.as_deref().unwrap_or_default(),
            category.as_deref().unwrap_or_default(),
        );

        ScrapedRecord {
            company_name: or_fallback(raw.company_name, UNKNOWN_COMPANY),
            title: title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            url: raw.url,
            location: or_fallback(raw.location, UNKNOWN_LOCATION),
            experience: or_fallback(raw.experience, UNKNOWN_EXPERIENCE),
            education: or_fallback(raw.education, UNKNOWN_EDUCATION),
            employment_type: or_fallback(raw.employment_type, UNKNOWN_EMPLOYMENT_TYPE),
            category,
            salary: or_fallback(raw.salary, UNKNOWN_SALARY),
            deadline: parse_deadline(&deadline_text, today),
            deadline_text,
            tech_stack,
        }
    }

    /// Vocabulary entries found in the title or category text, in vocabulary
    /// order. A match must not be preceded by an ASCII letter or digit nor
    /// followed by an ASCII letter, so "java" is not found inside "javascript"
    /// while "python3" still counts as "python".
    pub fn tech_stack(&self, title: &str, category: &str) -> Vec<String> {
        let title = title.to_lowercase();
        let category = category.to_lowercase();

        let found: Vec<String> = self
            .vocabulary
            .iter()
            .filter(|keyword| contains_keyword(&title, keyword) || contains_keyword(&category, keyword))
            .cloned()
            .collect();

        if found.is_empty() {
            vec![NO_TECH_STACK.to_string()]
        } else {
            found
        }
    }
}

fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphabetic())
    })
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_fallback(value: Option<String>, fallback: &str) -> String {
    present(value).unwrap_or_else(|| fallback.to_string())
}

/// Calendar date for a deadline label, `None` for rolling or unreadable ones.
///
/// Besides the fixed phrases this reads `YYYY-MM-DD` (also with `.` or `/`),
/// `MM/DD` or `MM.DD` in the current year (next year once that day has
/// passed), and `D-N`. Leading `~`, a weekday in parentheses and a trailing
/// time are ignored.
pub fn parse_deadline(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim().trim_start_matches('~').trim();

    if text == CLOSES_TODAY {
        return Some(today);
    }
    if text == CLOSES_TOMORROW {
        return today.succ_opt();
    }
    if text.is_empty() || ROLLING_DEADLINES.contains(&text) {
        return None;
    }

    let date_part = text.split('(').next()?.split_whitespace().next()?;

    if let Some(days) = date_part
        .strip_prefix("D-")
        .or_else(|| date_part.strip_prefix("d-"))
    {
        let days: u64 = days.parse().ok()?;
        return today.checked_add_days(Days::new(days));
    }

    DATED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .or_else(|| parse_month_day(date_part, today))
}

fn parse_month_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut parts = text.trim_end_matches('.').split(['/', '.']);
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}
