// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crawler::normalizer::DEFAULT_TECH_KEYWORDS;

pub const DEFAULT_BASE_URL: &str = "https://www.saramin.co.kr";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Config section the values were read from
    #[serde(skip)]
    pub environment: String,
    pub database_path: PathBuf,
    pub log_path: PathBuf,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    /// Set when `DATABASE_PATH` replaced the configured database location
    #[serde(skip)]
    pub database_path_overridden: bool,
}

/// Crawl parameters handed to the orchestrator. Every field has a default so
/// config files only need to list what they change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub keywords: Vec<String>,
    pub pages_per_keyword: u32,
    pub page_delay_ms: u64,
    /// No timeout is applied to page fetches unless this is set.
    pub request_timeout_secs: Option<u64>,
    pub tech_vocabulary: Vec<String>,
    pub auto_approve: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        let keywords: Vec<String> = DEFAULT_TECH_KEYWORDS.iter().map(|k| k.to_string()).collect();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tech_vocabulary: keywords.clone(),
            keywords,
            pages_per_keyword: 3,
            page_delay_ms: 2000,
            request_timeout_secs: None,
            auto_approve: true,
        }
    }
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

impl EnvironmentConfig {
    /// Load configuration based on environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        Self::load_from_file(Path::new("config.yaml"), &environment)
    }

    fn get_environment() -> String {
        std::env::var("CRAWLER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from_file(config_path: &Path, environment: &str) -> Result<Self> {
        if !config_path.exists() {
            anyhow::bail!(
                "{} not found. The crawler cannot start without configuration.",
                config_path.display()
            );
        }

        let config_content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let mut config = Self::from_yaml(&config_content, environment)?;

        if let Ok(database_path) = std::env::var("DATABASE_PATH") {
            config.database_path = Self::resolve_path(Path::new(&database_path))?;
            config.database_path_overridden = true;
        }

        Ok(config)
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse crawler configuration")?;

        let (section, env_config) = match environment {
            "production" => ("production", config_file.production),
            _ => ("local", config_file.local),
        };

        if env_config.crawler.keywords.is_empty() {
            anyhow::bail!("crawler.keywords must list at least one search keyword");
        }

        Ok(Self {
            environment: section.to_string(),
            database_path: Self::resolve_path(&env_config.database_path)?,
            log_path: Self::resolve_path(&env_config.log_path)?,
            crawler: env_config.crawler,
            database_path_overridden: false,
        })
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// Ensure parent directories of the database and log file exist.
    /// Runs before logging is set up, so it reports through errors only.
    pub async fn ensure_directories(&self) -> Result<()> {
        for file in [&self.database_path, &self.log_path] {
            if let Some(parent) = file.parent() {
                crate::utils::ensure_directory(parent).await?;
            }
        }
        Ok(())
    }
}
