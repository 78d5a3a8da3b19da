use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::TimingEvent;

const COLUMNS: &str = "event_id, race_id, participant_id, checkpoint_id, registration_id, \
     timing_session_id, time_ms, elapsed_ms, sequence, device_ts, source, qualifier, \
     deleted, created_at";

pub struct TimingEventRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TimingEventRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, event_id: Uuid) -> Result<TimingEvent> {
        sqlx::query_as::<_, TimingEvent>(&format!(
            "SELECT {COLUMNS} FROM timing_events WHERE event_id = ?"
        ))
        .bind(event_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound("timing event"))
    }

    /// Earliest non-deleted event for a participant at a checkpoint. The
    /// authoritative event for start/finish determination.
    pub async fn earliest_at_checkpoint(
        &self,
        race_id: Uuid,
        participant_id: Uuid,
        checkpoint_id: Uuid,
    ) -> Result<Option<TimingEvent>> {
        let event = sqlx::query_as::<_, TimingEvent>(&format!(
            r#"
            SELECT {COLUMNS} FROM timing_events
            WHERE race_id = ? AND participant_id = ? AND checkpoint_id = ? AND deleted = 0
            ORDER BY time_ms LIMIT 1
            "#
        ))
        .bind(race_id)
        .bind(participant_id)
        .bind(checkpoint_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(event)
    }

    /// Non-deleted events for one participant, ascending by recorded time.
    pub async fn list_for_participant(
        &self,
        race_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<TimingEvent>> {
        let events = sqlx::query_as::<_, TimingEvent>(&format!(
            r#"
            SELECT {COLUMNS} FROM timing_events
            WHERE race_id = ? AND participant_id = ? AND deleted = 0
            ORDER BY time_ms
            "#
        ))
        .bind(race_id)
        .bind(participant_id)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    /// Non-deleted events at one checkpoint, ascending by recorded time.
    pub async fn list_at_checkpoint(
        &self,
        race_id: Uuid,
        checkpoint_id: Uuid,
    ) -> Result<Vec<TimingEvent>> {
        let events = sqlx::query_as::<_, TimingEvent>(&format!(
            r#"
            SELECT {COLUMNS} FROM timing_events
            WHERE race_id = ? AND checkpoint_id = ? AND deleted = 0
            ORDER BY time_ms
            "#
        ))
        .bind(race_id)
        .bind(checkpoint_id)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    /// All events for a race in sequence order, soft-deleted included.
    pub async fn list_for_race(&self, race_id: Uuid) -> Result<Vec<TimingEvent>> {
        let events = sqlx::query_as::<_, TimingEvent>(&format!(
            "SELECT {COLUMNS} FROM timing_events WHERE race_id = ? ORDER BY sequence"
        ))
        .bind(race_id)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn set_elapsed(&self, event_id: Uuid, elapsed_ms: Option<i64>) -> Result<()> {
        sqlx::query("UPDATE timing_events SET elapsed_ms = ? WHERE event_id = ?")
            .bind(elapsed_ms)
            .bind(event_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
