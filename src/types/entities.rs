use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== Persisted Entities =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub website: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recruiter {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company_id: String,
    pub category_id: Option<String>,
    pub url: String,
    pub location: String,
    pub experience: String,
    pub education: String,
    pub employment_type: String,
    pub salary: String,
    pub tech_stack: Vec<String>,
    pub deadline: Option<NaiveDate>,
    pub approved: bool,
    pub posted_at: DateTime<Utc>,
}

/// Row shape of `job_postings`; the technology set is stored as a JSON array.
#[derive(Debug, sqlx::FromRow)]
pub struct JobPostingRow {
    pub id: String,
    pub title: String,
    pub company_id: String,
    pub category_id: Option<String>,
    pub url: String,
    pub location: String,
    pub experience: String,
    pub education: String,
    pub employment_type: String,
    pub salary: String,
    pub tech_stack: String,
    pub deadline: Option<NaiveDate>,
    pub approved: bool,
    pub posted_at: DateTime<Utc>,
}

impl TryFrom<JobPostingRow> for JobPosting {
    type Error = anyhow::Error;

    fn try_from(row: JobPostingRow) -> Result<Self, Self::Error> {
        let tech_stack: Vec<String> = serde_json::from_str(&row.tech_stack)
            .map_err(|e| anyhow::anyhow!("Invalid tech_stack for posting {}: {}", row.id, e))?;

        Ok(Self {
            id: row.id,
            title: row.title,
            company_id: row.company_id,
            category_id: row.category_id,
            url: row.url,
            location: row.location,
            experience: row.experience,
            education: row.education,
            employment_type: row.employment_type,
            salary: row.salary,
            tech_stack,
            deadline: row.deadline,
            approved: row.approved,
            posted_at: row.posted_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: String,
    pub job_posting_id: String,
    pub status: JobState,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct JobStatusRow {
    pub id: String,
    pub job_posting_id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobStatusRow> for JobStatus {
    type Error = anyhow::Error;

    fn try_from(row: JobStatusRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            job_posting_id: row.job_posting_id,
            updated_at: row.updated_at,
        })
    }
}

/// Lifecycle of a posting. A posting without a status row reads as `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobState {
    #[default]
    Open,
    Closed,
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Open => "Open",
            JobState::Closed => "Closed",
            JobState::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(JobState::Open),
            "Closed" => Ok(JobState::Closed),
            "Cancelled" => Ok(JobState::Cancelled),
            other => anyhow::bail!("Unknown job status: {}", other),
        }
    }
}

// ===== Read-side Summaries =====

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub companies: i64,
    pub recruiters: i64,
    pub categories: i64,
    pub postings: i64,
    pub statuses: i64,
}
