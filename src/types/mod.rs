pub mod entities;

pub use entities::{
    Company, JobCategory, JobPosting, JobState, JobStatus, Recruiter, StoreStats,
};
