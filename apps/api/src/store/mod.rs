//! Record store: durable, insert-only persistence of résumé submissions.
//!
//! Persistence happens before any document is generated, so a submission is
//! kept even when rendering or compilation fails later in the request.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::ResumeSubmission;

pub use postgres::PgResumeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode section '{section}': {source}")]
    Encode {
        section: &'static str,
        source: serde_json::Error,
    },
}

/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Appends one row and returns its server-assigned id.
    async fn save(&self, submission: &ResumeSubmission) -> Result<Uuid, StoreError>;
}

/// Semi-structured sections as they are written to JSON columns.
/// Absent sections stay `None` (SQL NULL).
#[derive(Debug, Default, PartialEq)]
pub struct SectionColumns {
    pub education: Option<Value>,
    pub skills: Option<Value>,
    pub projects: Option<Value>,
    pub experience: Option<Value>,
    pub hackathons: Option<Value>,
    pub pors: Option<Value>,
    pub certifications: Option<Value>,
}

impl SectionColumns {
    pub fn from_submission(submission: &ResumeSubmission) -> Result<Self, StoreError> {
        Ok(Self {
            education: encode("education", &submission.education)?,
            skills: encode("skills", &submission.skills)?,
            projects: encode("projects", &submission.projects)?,
            experience: encode("experience", &submission.experience)?,
            hackathons: encode("hackathons", &submission.hackathons)?,
            pors: encode("pors", &submission.pors)?,
            certifications: encode("certifications", &submission.certifications)?,
        })
    }
}

fn encode<T: Serialize>(section: &'static str, value: &Option<T>) -> Result<Option<Value>, StoreError> {
    value
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|source| StoreError::Encode { section, source })
}
