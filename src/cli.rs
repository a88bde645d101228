// src/cli.rs
use crate::core::{Database, JobStore};
use crate::environment::EnvironmentConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "job-crawler")]
#[command(about = "Crawl Saramin job postings into the job-board database")]
pub struct CrawlerCli {
    #[command(subcommand)]
    pub command: Option<CrawlerCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CrawlerCommand {
    /// Crawl every configured keyword and store new postings (default)
    Crawl,
    /// Create the database schema and exit
    Init,
    /// Print row counts of the job-board tables as JSON
    Stats,
    /// Show a stored posting and its effective status
    Posting { url: String },
}

pub async fn handle_command(cli: CrawlerCli, config: &EnvironmentConfig) -> Result<()> {
    match cli.command.unwrap_or(CrawlerCommand::Crawl) {
        CrawlerCommand::Crawl => {
            info!("🚀 Starting crawl...");
            let report = crate::run_crawl(config).await?;

            info!("✅ Crawl finished");
            info!("   Created:      {}", report.total_created());
            info!("   Duplicates:   {}", report.total_duplicates());
            info!("   Parse errors: {}", report.total_parse_errors());
            info!("   Failed:       {}", report.total_failed());

            let failed = report.failed_keywords();
            if !failed.is_empty() {
                warn!("⚠️  Keywords cut short by fetch errors: {}", failed.join(", "));
            }
        }

        CrawlerCommand::Init => {
            let db = Database::new(&config.database_path).await?;
            let health = db.health_check().await;
            db.close().await;
            health?;

            info!(
                "✅ Database initialized at: {}",
                config.database_path.display()
            );
            info!("   Tables: companies, recruiters, job_categories, job_postings, job_statuses");
        }

        CrawlerCommand::Stats => {
            let db = Database::new(&config.database_path).await?;
            let stats = JobStore::new(db.pool()).stats().await;
            db.close().await;

            println!("{}", serde_json::to_string_pretty(&stats?)?);
        }

        CrawlerCommand::Posting { url } => {
            let db = Database::new(&config.database_path).await?;
            let found = show_posting(&db, &url).await;
            db.close().await;

            match found? {
                Some(details) => println!("{}", serde_json::to_string_pretty(&details)?),
                None => info!("❌ No posting stored for: {}", url),
            }
        }
    }

    Ok(())
}

async fn show_posting(db: &Database, url: &str) -> Result<Option<serde_json::Value>> {
    let store = JobStore::new(db.pool());
    let Some(posting) = store.find_posting_by_url(url).await? else {
        return Ok(None);
    };
    let status = store.posting_state(&posting.id).await?;

    Ok(Some(serde_json::json!({
        "posting": posting,
        "status": status,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_is_the_default_command() {
        let cli = CrawlerCli::try_parse_from(["job-crawler"]).unwrap();
        assert_eq!(cli.command, None);

        let cli = CrawlerCli::try_parse_from(["job-crawler", "crawl"]).unwrap();
        assert_eq!(cli.command, Some(CrawlerCommand::Crawl));
    }

    #[test]
    fn test_crawl_takes_no_flags() {
        assert!(CrawlerCli::try_parse_from(["job-crawler", "crawl", "--pages", "5"]).is_err());
    }

    #[test]
    fn test_posting_command_takes_url() {
        let cli = CrawlerCli::try_parse_from([
            "job-crawler",
            "posting",
            "https://www.saramin.co.kr/jobs/1",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(CrawlerCommand::Posting {
                url: "https://www.saramin.co.kr/jobs/1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_show_posting_reports_open_without_status_row() {
        use crate::core::NewJobPosting;

        let db = Database::in_memory().await.unwrap();
        let store = JobStore::new(db.pool());
        store.insert_company_if_absent("Acme").await.unwrap();
        let company = store.find_company_by_name("Acme").await.unwrap().unwrap();
        store
            .insert_posting(&NewJobPosting {
                title: "Docker 엔지니어".to_string(),
                company_id: company.id,
                category_id: None,
                url: "https://www.saramin.co.kr/jobs/7".to_string(),
                location: "판교".to_string(),
                experience: "신입".to_string(),
                education: "학력무관".to_string(),
                employment_type: "정규직".to_string(),
                salary: "Not Specified".to_string(),
                tech_stack: vec!["docker".to_string()],
                deadline: None,
                approved: true,
            })
            .await
            .unwrap();

        let details = show_posting(&db, "https://www.saramin.co.kr/jobs/7")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details["status"], "Open");
        assert_eq!(details["posting"]["tech_stack"][0], "docker");

        assert!(show_posting(&db, "https://www.saramin.co.kr/jobs/8")
            .await
            .unwrap()
            .is_none());
    }
}
