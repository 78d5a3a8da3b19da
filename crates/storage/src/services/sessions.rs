use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dto::session::{StartSessionRequest, UpdateSessionRequest};
use crate::error::{Result, StorageError};
use crate::models::TimingSession;
use crate::repository::race::RaceRepository;
use crate::repository::timing_session::TimingSessionRepository;

pub async fn start_session(
    pool: &SqlitePool,
    race_id: Uuid,
    req: &StartSessionRequest,
) -> Result<TimingSession> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let session = TimingSessionRepository::new(pool)
        .create(race_id, req.device_id.as_deref())
        .await?;

    tracing::debug!(race_id = %race_id, session_id = %session.session_id, "timing session started");

    Ok(session)
}

pub async fn end_session(pool: &SqlitePool, session_id: Uuid) -> Result<TimingSession> {
    let repo = TimingSessionRepository::new(pool);
    let session = repo.find_by_id(session_id).await?;

    if session.ended_at.is_some() {
        return Err(StorageError::invalid_state("timing session already ended"));
    }

    repo.set_ended(session_id).await
}

pub async fn update_session(
    pool: &SqlitePool,
    session_id: Uuid,
    req: &UpdateSessionRequest,
) -> Result<TimingSession> {
    if let Some(metadata) = &req.metadata {
        serde_json::from_str::<serde_json::Value>(metadata)
            .map_err(|_| StorageError::validation("metadata is not valid JSON"))?;
    }

    TimingSessionRepository::new(pool)
        .update(session_id, req.device_id.as_deref(), req.metadata.as_deref())
        .await
}
