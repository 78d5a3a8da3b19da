use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dto::participant::{CreateParticipantRequest, UpdateParticipantRequest};
use crate::error::{Result, StorageError};
use crate::models::Participant;

const COLUMNS: &str =
    "participant_id, race_id, first_name, last_name, gender, birth_year, country, created_at";

pub struct ParticipantRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, race_id: Uuid, req: &CreateParticipantRequest) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(&format!(
            r#"
            INSERT INTO participants (participant_id, race_id, first_name, last_name, gender, birth_year, country, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(race_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.gender)
        .bind(req.birth_year)
        .bind(&req.country)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(participant)
    }

    pub async fn update(
        &self,
        participant_id: Uuid,
        req: &UpdateParticipantRequest,
    ) -> Result<Participant> {
        let existing = self.find_by_id(participant_id).await?;

        let participant = sqlx::query_as::<_, Participant>(&format!(
            r#"
            UPDATE participants
            SET first_name = ?, last_name = ?, gender = ?, birth_year = ?, country = ?
            WHERE participant_id = ?
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(req.first_name.as_ref().unwrap_or(&existing.first_name))
        .bind(req.last_name.as_ref().unwrap_or(&existing.last_name))
        .bind(req.gender.as_ref().or(existing.gender.as_ref()))
        .bind(req.birth_year.or(existing.birth_year))
        .bind(req.country.as_ref().or(existing.country.as_ref()))
        .bind(participant_id)
        .fetch_one(self.pool)
        .await?;

        Ok(participant)
    }

    pub async fn find_by_id(&self, participant_id: Uuid) -> Result<Participant> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {COLUMNS} FROM participants WHERE participant_id = ?"
        ))
        .bind(participant_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound("participant"))
    }

    /// Participants in creation order; the deterministic tie-break for
    /// equal chip times during ranking.
    pub async fn list_for_race(&self, race_id: Uuid) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {COLUMNS} FROM participants WHERE race_id = ? ORDER BY created_at, participant_id"
        ))
        .bind(race_id)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn belongs_to_race(&self, participant_id: Uuid, race_id: Uuid) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM participants WHERE participant_id = ? AND race_id = ?",
        )
        .bind(participant_id)
        .bind(race_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(found.is_some())
    }
}
