use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::TimingSession;

const COLUMNS: &str = "session_id, race_id, device_id, metadata, started_at, ended_at";

pub struct TimingSessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TimingSessionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, race_id: Uuid, device_id: Option<&str>) -> Result<TimingSession> {
        let session = sqlx::query_as::<_, TimingSession>(&format!(
            r#"
            INSERT INTO timing_sessions (session_id, race_id, device_id, metadata, started_at, ended_at)
            VALUES (?, ?, ?, NULL, ?, NULL)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(race_id)
        .bind(device_id)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }

    pub async fn find_by_id(&self, session_id: Uuid) -> Result<TimingSession> {
        sqlx::query_as::<_, TimingSession>(&format!(
            "SELECT {COLUMNS} FROM timing_sessions WHERE session_id = ?"
        ))
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound("timing session"))
    }

    pub async fn set_ended(&self, session_id: Uuid) -> Result<TimingSession> {
        let session = sqlx::query_as::<_, TimingSession>(&format!(
            r#"
            UPDATE timing_sessions SET ended_at = ?
            WHERE session_id = ?
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Utc::now())
        .bind(session_id)
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }

    pub async fn update(
        &self,
        session_id: Uuid,
        device_id: Option<&str>,
        metadata: Option<&str>,
    ) -> Result<TimingSession> {
        let existing = self.find_by_id(session_id).await?;

        let session = sqlx::query_as::<_, TimingSession>(&format!(
            r#"
            UPDATE timing_sessions SET device_id = ?, metadata = ?
            WHERE session_id = ?
            RETURNING {COLUMNS}
            "#
        ))
        .bind(device_id.or(existing.device_id.as_deref()))
        .bind(metadata.or(existing.metadata.as_deref()))
        .bind(session_id)
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }
}
