// src/core/mod.rs
//! Storage services shared by the crawler and the CLI

pub mod database;
pub mod store;

pub use database::Database;
pub use store::{JobStore, NewJobPosting};
