use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::ResultAdjustment;

pub struct AdjustmentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdjustmentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_participant(
        &self,
        race_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<ResultAdjustment>> {
        let adjustments = sqlx::query_as::<_, ResultAdjustment>(
            r#"
            SELECT adjustment_id, race_id, participant_id, adjustment_ms, reason, created_at
            FROM result_adjustments
            WHERE race_id = ? AND participant_id = ?
            ORDER BY created_at, adjustment_id
            "#,
        )
        .bind(race_id)
        .bind(participant_id)
        .fetch_all(self.pool)
        .await?;

        Ok(adjustments)
    }

    /// Net adjustment per participant for a race; the overlay re-applied
    /// after every full recompute.
    pub async fn totals_for_race(&self, race_id: Uuid) -> Result<HashMap<Uuid, i64>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT participant_id, SUM(adjustment_ms)
            FROM result_adjustments
            WHERE race_id = ?
            GROUP BY participant_id
            "#,
        )
        .bind(race_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
