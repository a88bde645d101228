// src/core/database.rs
//! SQLite connection management and schema migrations

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        industry TEXT NOT NULL,
        website TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recruiters (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        company_id TEXT NOT NULL REFERENCES companies(id),
        created_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_recruiters_company_id ON recruiters(company_id);",
    r#"
    CREATE TABLE IF NOT EXISTS job_categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_postings (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        company_id TEXT NOT NULL REFERENCES companies(id),
        category_id TEXT REFERENCES job_categories(id),
        url TEXT NOT NULL UNIQUE,
        location TEXT NOT NULL,
        experience TEXT NOT NULL,
        education TEXT NOT NULL,
        employment_type TEXT NOT NULL,
        salary TEXT NOT NULL,
        tech_stack TEXT NOT NULL DEFAULT '[]',
        deadline TEXT,
        approved BOOLEAN NOT NULL DEFAULT TRUE,
        posted_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_job_postings_company_id ON job_postings(company_id);",
    "CREATE INDEX IF NOT EXISTS idx_job_postings_approved ON job_postings(approved);",
    r#"
    CREATE TABLE IF NOT EXISTS job_statuses (
        id TEXT PRIMARY KEY,
        job_posting_id TEXT NOT NULL UNIQUE REFERENCES job_postings(id),
        status TEXT NOT NULL DEFAULT 'Open'
            CHECK (status IN ('Open', 'Closed', 'Cancelled')),
        updated_at TEXT NOT NULL
    );
    "#,
];

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            crate::utils::ensure_directory(parent).await?;
        }

        let options = SqliteConnectOptions::new().filename(database_path);
        let db = Self::connect(options).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );
        Ok(db)
    }

    /// Ephemeral database, used by tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let options = options.create_if_missing(true).foreign_keys(true);

        // One writer, one connection. Idle reaping would drop an in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get pool reference for custom operations
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Database migration failed")?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    /// Release the connection. Called once at the end of a run.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}
