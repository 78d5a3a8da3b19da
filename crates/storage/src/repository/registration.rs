use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dto::participant::CreateRegistrationRequest;
use crate::error::Result;
use crate::models::Registration;

pub struct RegistrationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RegistrationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        participant_id: Uuid,
        req: &CreateRegistrationRequest,
    ) -> Result<Registration> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (registration_id, participant_id, bib, wave, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING registration_id, participant_id, bib, wave, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(participant_id)
        .bind(&req.bib)
        .bind(&req.wave)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(registration)
    }

    /// Earliest registration for a participant; results reference this one.
    pub async fn find_for_participant(&self, participant_id: Uuid) -> Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            SELECT registration_id, participant_id, bib, wave, created_at
            FROM registrations WHERE participant_id = ?
            ORDER BY created_at LIMIT 1
            "#,
        )
        .bind(participant_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(registration)
    }
}
