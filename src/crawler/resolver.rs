// src/crawler/resolver.rs
//! Get-or-create resolution of the entities a posting refers to.
//!
//! Both operations are idempotent: repeated calls with the same name return
//! the same id and never create a second row. Creation relies on unique
//! indexes and conditional inserts, so concurrent writers converge on the
//! same row as well.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::core::JobStore;
use crate::utils::{placeholder_email, placeholder_recruiter_name};

pub struct EntityResolver<'a> {
    store: JobStore<'a>,
}

impl<'a> EntityResolver<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            store: JobStore::new(pool),
        }
    }

    /// Company id for an exact (case-preserving) name. A new company gets
    /// placeholder details, and every company ends up with exactly one
    /// placeholder recruiter.
    pub async fn resolve_company(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Company name must not be empty");
        }

        let created = self.store.insert_company_if_absent(name).await?;
        let company = self
            .store
            .find_company_by_name(name)
            .await?
            .with_context(|| format!("Company '{}' not found after insert", name))?;

        if created {
            info!("New company saved: {}", name);
        } else {
            debug!("Existing company: {}", name);
        }

        let recruiter_created = self
            .store
            .insert_recruiter_if_absent(
                &company.id,
                &placeholder_recruiter_name(name),
                &placeholder_email(name),
            )
            .await?;
        if recruiter_created {
            info!("New recruiter saved for company: {}", name);
        }

        Ok(company.id)
    }

    /// Category id for an exact name; no name means no category.
    pub async fn resolve_category(&self, name: Option<&str>) -> Result<Option<String>> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        if self.store.insert_category_if_absent(name).await? {
            info!("New job category saved: {}", name);
        }

        let category = self
            .store
            .find_category_by_name(name)
            .await?
            .with_context(|| format!("Job category '{}' not found after insert", name))?;
        Ok(Some(category.id))
    }
}
