use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ResumeStore, SectionColumns, StoreError};
use crate::models::resume::{ResumeRow, ResumeSubmission};

/// PostgreSQL-backed store writing to the `resumes` table.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn save(&self, submission: &ResumeSubmission) -> Result<Uuid, StoreError> {
        let sections = SectionColumns::from_submission(submission)?;

        // Append-only: one INSERT per submission, never UPDATE
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, name, email, phone, linkedin, github, summary,
                 education, skills, projects, experience, hackathons, pors, certifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.linkedin)
        .bind(&submission.github)
        .bind(&submission.summary)
        .bind(sections.education)
        .bind(sections.skills)
        .bind(sections.projects)
        .bind(sections.experience)
        .bind(sections.hackathons)
        .bind(sections.pors)
        .bind(sections.certifications)
        .fetch_one(&self.pool)
        .await?;

        info!("Persisted resume {} at {}", row.id, row.created_at);
        Ok(row.id)
    }
}
