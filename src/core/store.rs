// src/core/store.rs
//! Entity reads and writes over the job-board tables

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::types::entities::{JobPostingRow, JobStatusRow};
use crate::types::{
    Company, JobCategory, JobPosting, JobState, JobStatus, Recruiter, StoreStats,
};

pub const PLACEHOLDER_INDUSTRY: &str = "Unknown";
pub const PLACEHOLDER_LOCATION: &str = "Unknown";

/// Column values for a posting about to be inserted.
#[derive(Debug, Clone)]
pub struct NewJobPosting {
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
}

pub struct JobStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Companies =====

    /// Insert a company with placeholder details unless the name is taken.
    /// Returns whether a row was created.
    pub async fn insert_company_if_absent(&self, name: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO companies (id, name, industry, website, location, created_at)
            VALUES (?, ?, ?, '', ?, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(PLACEHOLDER_INDUSTRY)
        .bind(PLACEHOLDER_LOCATION)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to insert company: {}", name))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, industry, website, location, created_at
            FROM companies
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(company)
    }

    // ===== Recruiters =====

    /// Insert a recruiter only when the company has none yet. The check and the
    /// insert are one statement, so two callers cannot both create one.
    pub async fn insert_recruiter_if_absent(
        &self,
        company_id: &str,
        name: &str,
        email: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO recruiters (id, name, email, phone, company_id, created_at)
            SELECT ?, ?, ?, NULL, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM recruiters WHERE company_id = ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(email)
        .bind(company_id)
        .bind(Utc::now())
        .bind(company_id)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to insert recruiter for company {}", company_id))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn recruiters_for_company(&self, company_id: &str) -> Result<Vec<Recruiter>> {
        let recruiters = sqlx::query_as::<_, Recruiter>(
            r#"
            SELECT id, name, email, phone, company_id, created_at
            FROM recruiters
            WHERE company_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(self.pool)
        .await?;

        Ok(recruiters)
    }

    // ===== Categories =====

    pub async fn insert_category_if_absent(&self, name: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_categories (id, name, description, created_at)
            VALUES (?, ?, NULL, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to insert job category: {}", name))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_category_by_name(&self, name: &str) -> Result<Option<JobCategory>> {
        let category = sqlx::query_as::<_, JobCategory>(
            r#"
            SELECT id, name, description, created_at
            FROM job_categories
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    // ===== Postings =====

    pub async fn posting_exists(&self, url: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM job_postings WHERE url = ?")
            .bind(url)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Insert a posting keyed by its URL. Returns the new id, or `None` when a
    /// posting with that URL already exists.
    pub async fn insert_posting(&self, posting: &NewJobPosting) -> Result<Option<String>> {
        let id = Uuid::new_v4().to_string();
        let tech_stack =
            serde_json::to_string(&posting.tech_stack).context("Failed to encode tech stack")?;

        let result = sqlx::query(
            r#"
            INSERT INTO job_postings (
                id, title, company_id, category_id, url, location, experience,
                education, employment_type, salary, tech_stack, deadline, approved, posted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(&posting.title)
        .bind(&posting.company_id)
        .bind(&posting.category_id)
        .bind(&posting.url)
        .bind(&posting.location)
        .bind(&posting.experience)
        .bind(&posting.education)
        .bind(&posting.employment_type)
        .bind(&posting.salary)
        .bind(tech_stack)
        .bind(posting.deadline)
        .bind(posting.approved)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to insert job posting: {}", posting.url))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(id))
    }

    pub async fn find_posting_by_url(&self, url: &str) -> Result<Option<JobPosting>> {
        let row = sqlx::query_as::<_, JobPostingRow>(
            r#"
            SELECT id, title, company_id, category_id, url, location, experience, education,
                   employment_type, salary, tech_stack, deadline, approved, posted_at
            FROM job_postings
            WHERE url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        row.map(JobPosting::try_from).transpose()
    }

    pub async fn count_postings(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_postings")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    // ===== Statuses =====

    pub async fn insert_status(&self, job_posting_id: &str, state: JobState) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO job_statuses (id, job_posting_id, status, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(job_posting_id)
        .bind(state.as_str())
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to save job status for posting {}", job_posting_id))?;

        Ok(id)
    }

    pub async fn find_status(&self, job_posting_id: &str) -> Result<Option<JobStatus>> {
        let row = sqlx::query_as::<_, JobStatusRow>(
            r#"
            SELECT id, job_posting_id, status, updated_at
            FROM job_statuses
            WHERE job_posting_id = ?
            "#,
        )
        .bind(job_posting_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(JobStatus::try_from).transpose()
    }

    /// Effective state of a posting; a missing status row counts as `Open`.
    pub async fn posting_state(&self, job_posting_id: &str) -> Result<JobState> {
        Ok(self
            .find_status(job_posting_id)
            .await?
            .map(|status| status.status)
            .unwrap_or_default())
    }

    // ===== Summary =====

    pub async fn stats(&self) -> Result<StoreStats> {
        let (companies, recruiters, categories, postings, statuses): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM companies),
                    (SELECT COUNT(*) FROM recruiters),
                    (SELECT COUNT(*) FROM job_categories),
                    (SELECT COUNT(*) FROM job_postings),
                    (SELECT COUNT(*) FROM job_statuses)
                "#,
            )
            .fetch_one(self.pool)
            .await?;

        Ok(StoreStats {
            companies,
            recruiters,
            categories,
            postings,
            statuses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;

    fn sample_posting(company_id: &str, url: &str) -> NewJobPosting {
        NewJobPosting {
            title: "Backend Engineer".to_string(),
            company_id: company_id.to_string(),
            category_id: None,
            url: url.to_string(),
            location: "서울 강남구".to_string(),
            experience: "경력 3년↑".to_string(),
            education: "대졸↑".to_string(),
            employment_type: "정규직".to_string(),
            salary: "Not Specified".to_string(),
            tech_stack: vec!["python".to_string()],
            deadline: NaiveDate::from_ymd_opt(2026, 11, 30),
            approved: true,
        }
    }

    async fn company_id(store: &JobStore<'_>, name: &str) -> String {
        store.insert_company_if_absent(name).await.unwrap();
        store.find_company_by_name(name).await.unwrap().unwrap().id
    }

    #[tokio::test]
    async fn test_company_insert_is_conditional() {
        let db = Database::in_memory().await.unwrap();
        let store = JobStore::new(db.pool());

        assert!(store.insert_company_if_absent("Acme").await.unwrap());
        assert!(!store.insert_company_if_absent("Acme").await.unwrap());
        assert!(store.insert_company_if_absent("acme").await.unwrap());

        let company = store.find_company_by_name("Acme").await.unwrap().unwrap();
        assert_eq!(company.industry, PLACEHOLDER_INDUSTRY);
        assert_eq!(company.website, "");
        assert_eq!(store.stats().await.unwrap().companies, 2);
    }

    #[tokio::test]
    async fn test_recruiter_insert_only_once_per_company() {
        let db = Database::in_memory().await.unwrap();
        let store = JobStore::new(db.pool());
        let id = company_id(&store, "Acme").await;

        assert!(store.insert_recruiter_if_absent(&id, "Acme 담당자", "acme@example.com").await.unwrap());
        assert!(!store.insert_recruiter_if_absent(&id, "Other", "other@example.com").await.unwrap());

        let recruiters = store.recruiters_for_company(&id).await.unwrap();
        assert_eq!(recruiters.len(), 1);
        assert_eq!(recruiters[0].email, "acme@example.com");
    }

    #[tokio::test]
    async fn test_posting_url_is_unique() {
        let db = Database::in_memory().await.unwrap();
        let store = JobStore::new(db.pool());
        let id = company_id(&store, "Acme").await;
        let posting = sample_posting(&id, "https://www.saramin.co.kr/jobs/1");

        assert!(store.insert_posting(&posting).await.unwrap().is_some());
        assert!(store.insert_posting(&posting).await.unwrap().is_none());
        assert!(store.posting_exists(&posting.url).await.unwrap());
        assert_eq!(store.count_postings().await.unwrap(), 1);

        let stored = store.find_posting_by_url(&posting.url).await.unwrap().unwrap();
        assert_eq!(stored.tech_stack, vec!["python"]);
        assert_eq!(stored.deadline, posting.deadline);
        assert!(stored.approved);
    }

    #[tokio::test]
    async fn test_posting_requires_existing_company() {
        let db = Database::in_memory().await.unwrap();
        let store = JobStore::new(db.pool());
        let posting = sample_posting("missing-company", "https://www.saramin.co.kr/jobs/2");

        assert!(store.insert_posting(&posting).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_status_reads_as_open() {
        let db = Database::in_memory().await.unwrap();
        let store = JobStore::new(db.pool());
        let id = company_id(&store, "Acme").await;
        let posting_id = store
            .insert_posting(&sample_posting(&id, "https://www.saramin.co.kr/jobs/3"))
            .await
            .unwrap()
            .unwrap();

        assert!(store.find_status(&posting_id).await.unwrap().is_none());
        assert_eq!(store.posting_state(&posting_id).await.unwrap(), JobState::Open);

        store.insert_status(&posting_id, JobState::Closed).await.unwrap();
        assert_eq!(store.posting_state(&posting_id).await.unwrap(), JobState::Closed);
        assert!(store.insert_status(&posting_id, JobState::Open).await.is_err());
    }
}
