use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{ResumeStore, SectionColumns, StoreError};
use crate::models::resume::{ResumeRow, ResumeSubmission};

/// In-process store for handler tests. Can be switched into a failing mode.
#[derive(Default)]
pub struct MemoryResumeStore {
    rows: Mutex<Vec<ResumeRow>>,
    fail: bool,
}

impl MemoryResumeStore {
    pub fn failing() -> Self {
        Self {
            rows: Mutex::default(),
            fail: true,
        }
    }

    pub fn rows(&self) -> Vec<ResumeRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn save(&self, submission: &ResumeSubmission) -> Result<Uuid, StoreError> {
        if self.fail {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let sections = SectionColumns::from_submission(submission)?;
        let row = ResumeRow {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            name: submission.name.clone(),
            email: submission.email.clone(),
            phone: submission.phone.clone(),
            linkedin: submission.linkedin.clone(),
            github: submission.github.clone(),
            summary: submission.summary.clone(),
            education: sections.education,
            skills: sections.skills,
            projects: sections.projects,
            experience: sections.experience,
            hackathons: sections.hackathons,
            pors: sections.pors,
            certifications: sections.certifications,
        };
        let id = row.id;
        self.rows.lock().unwrap().push(row);
        Ok(id)
    }
}
