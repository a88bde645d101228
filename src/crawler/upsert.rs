// src/crawler/upsert.rs
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use super::resolver::EntityResolver;
use super::types::{ScrapedRecord, UpsertOutcome};
use crate::core::{JobStore, NewJobPosting};
use crate::types::JobState;

/// Writes scraped records as postings, keyed by source URL.
///
/// Postings are append-only: a URL that is already stored is skipped and the
/// stored posting is never modified.
pub struct PostingUpserter<'a> {
    store: JobStore<'a>,
    resolver: EntityResolver<'a>,
    auto_approve: bool,
}

impl<'a> PostingUpserter<'a> {
    pub fn new(pool: &'a SqlitePool, auto_approve: bool) -> Self {
        Self {
            store: JobStore::new(pool),
            resolver: EntityResolver::new(pool),
            auto_approve,
        }
    }

    pub async fn upsert_posting(&self, record: &ScrapedRecord) -> Result<UpsertOutcome> {
        if self.store.posting_exists(&record.url).await? {
            debug!("Skipping duplicate job: {} ({})", record.title, record.url);
            return Ok(UpsertOutcome::Skipped);
        }

        let company_id = self
            .resolver
            .resolve_company(&record.company_name)
            .await
            .with_context(|| format!("Failed to resolve company '{}'", record.company_name))?;

        let category_id = self
            .resolver
            .resolve_category(record.category.as_deref())
            .await
            .with_context(|| format!("Failed to resolve category '{}'", record.category_label()))?;

        let posting = NewJobPosting {
            title: record.title.clone(),
            company_id,
            category_id,
            url: record.url.clone(),
            location: record.location.clone(),
            experience: record.experience.clone(),
            education: record.education.clone(),
            employment_type: record.employment_type.clone(),
            salary: record.salary.clone(),
            tech_stack: record.tech_stack.clone(),
            deadline: record.deadline,
            approved: self.auto_approve,
        };

        let Some(posting_id) = self.store.insert_posting(&posting).await? else {
            debug!("Job stored concurrently, skipping: {}", record.url);
            return Ok(UpsertOutcome::Skipped);
        };

        // The posting stands even if its status row cannot be written.
        let status_recorded = match self.store.insert_status(&posting_id, JobState::Open).await {
            Ok(_) => true,
            Err(e) => {
                error!("Error saving job status for posting {}: {:#}", posting_id, e);
                false
            }
        };

        info!("Saved job: {} [{}]", record.title, record.category_label());
        Ok(UpsertOutcome::Created {
            posting_id,
            status_recorded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use chrono::NaiveDate;

    fn record(url: &str, company: &str, category: Option<&str>) -> ScrapedRecord {
        ScrapedRecord {
            company_name: company.to_string(),
            title: "Python 백엔드 개발자".to_string(),
            url: url.to_string(),
            location: "서울 강남구".to_string(),
            experience: "경력 3~5년".to_string(),
            education: "대졸↑".to_string(),
            employment_type: "정규직".to_string(),
            category: category.map(str::to_string),
            salary: "면접 후 결정".to_string(),
            deadline_text: "~ 11/30(월)".to_string(),
            deadline: NaiveDate::from_ymd_opt(2026, 11, 30),
            tech_stack: vec!["python".to_string()],
        }
    }

    fn batch() -> Vec<ScrapedRecord> {
        vec![
            record("https://www.saramin.co.kr/jobs/1", "Acme", Some("백엔드")),
            record("https://www.saramin.co.kr/jobs/2", "Acme", Some("백엔드")),
            record("https://www.saramin.co.kr/jobs/3", "Globex", None),
        ]
    }

    #[tokio::test]
    async fn test_new_posting_created_with_open_status() {
        let db = Database::in_memory().await.unwrap();
        let upserter = PostingUpserter::new(db.pool(), true);
        let store = JobStore::new(db.pool());

        let outcome = upserter.upsert_posting(&batch()[0]).await.unwrap();
        let UpsertOutcome::Created { posting_id, status_recorded } = outcome else {
            panic!("expected a created posting");
        };
        assert!(status_recorded);

        let posting = store
            .find_posting_by_url("https://www.saramin.co.kr/jobs/1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(posting.id, posting_id);
        assert!(posting.category_id.is_some());
        assert_eq!(posting.salary, "면접 후 결정");
        assert!(posting.approved);

        let status = store.find_status(&posting_id).await.unwrap().unwrap();
        assert_eq!(status.status, JobState::Open);
    }

    #[tokio::test]
    async fn test_rerunning_batch_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let upserter = PostingUpserter::new(db.pool(), true);
        let store = JobStore::new(db.pool());

        for record in batch() {
            upserter.upsert_posting(&record).await.unwrap();
        }
        let after_first = store.stats().await.unwrap();

        for record in batch() {
            let outcome = upserter.upsert_posting(&record).await.unwrap();
            assert_eq!(outcome, UpsertOutcome::Skipped);
        }
        let after_second = store.stats().await.unwrap();

        assert_eq!(after_first.postings, 3);
        assert_eq!(after_first, after_second);
        assert_eq!(after_second.companies, 2);
        assert_eq!(after_second.recruiters, 2);
        assert_eq!(after_second.categories, 1);
        assert_eq!(after_second.statuses, 3);
    }

    #[tokio::test]
    async fn test_existing_posting_is_not_modified() {
        let db = Database::in_memory().await.unwrap();
        let upserter = PostingUpserter::new(db.pool(), true);
        let store = JobStore::new(db.pool());

        let original = record("https://www.saramin.co.kr/jobs/9", "Acme", None);
        upserter.upsert_posting(&original).await.unwrap();

        let mut changed = original.clone();
        changed.title = "Renamed".to_string();
        changed.company_name = "Other Company".to_string();
        assert_eq!(upserter.upsert_posting(&changed).await.unwrap(), UpsertOutcome::Skipped);

        let posting = store.find_posting_by_url(&original.url).await.unwrap().unwrap();
        assert_eq!(posting.title, original.title);
        assert!(store.find_company_by_name("Other Company").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_failure_keeps_posting() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            r#"
            CREATE TRIGGER reject_status BEFORE INSERT ON job_statuses
            BEGIN
                SELECT RAISE(ABORT, 'status write rejected');
            END;
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let upserter = PostingUpserter::new(db.pool(), true);
        let store = JobStore::new(db.pool());

        let outcome = upserter.upsert_posting(&batch()[0]).await.unwrap();
        let UpsertOutcome::Created { posting_id, status_recorded } = outcome else {
            panic!("expected a created posting");
        };
        assert!(!status_recorded);

        assert!(store
            .find_posting_by_url("https://www.saramin.co.kr/jobs/1")
            .await
            .unwrap()
            .is_some());
        assert!(store.find_status(&posting_id).await.unwrap().is_none());
        assert_eq!(store.posting_state(&posting_id).await.unwrap(), JobState::Open);
    }

    #[tokio::test]
    async fn test_entity_failure_skips_record() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            r#"
            CREATE TRIGGER reject_company BEFORE INSERT ON companies
            BEGIN
                SELECT RAISE(ABORT, 'company write rejected');
            END;
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let upserter = PostingUpserter::new(db.pool(), true);
        assert!(upserter.upsert_posting(&batch()[0]).await.is_err());
        assert_eq!(JobStore::new(db.pool()).count_postings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_approval_flag_follows_configuration() {
        let db = Database::in_memory().await.unwrap();
        let upserter = PostingUpserter::new(db.pool(), false);

        upserter.upsert_posting(&batch()[2]).await.unwrap();

        let posting = JobStore::new(db.pool())
            .find_posting_by_url("https://www.saramin.co.kr/jobs/3")
            .await
            .unwrap()
            .unwrap();
        assert!(!posting.approved);
        assert_eq!(posting.category_id, None);
    }
}
