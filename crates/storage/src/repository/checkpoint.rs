use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dto::checkpoint::CreateCheckpointRequest;
use crate::error::{Result, StorageError};
use crate::models::Checkpoint;

pub struct CheckpointRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CheckpointRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a checkpoint, holding the one-start / one-finish invariant
    /// for the race.
    pub async fn create(&self, race_id: Uuid, req: &CreateCheckpointRequest) -> Result<Checkpoint> {
        if req.is_start && self.find_start(race_id).await?.is_some() {
            return Err(StorageError::validation(
                "race already has a start checkpoint",
            ));
        }
        if req.is_finish && self.find_finish(race_id).await?.is_some() {
            return Err(StorageError::validation(
                "race already has a finish checkpoint",
            ));
        }

        let checkpoint = sqlx::query_as::<_, Checkpoint>(
            r#"
            INSERT INTO checkpoints (checkpoint_id, race_id, name, order_index, is_start, is_finish, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING checkpoint_id, race_id, name, order_index, is_start, is_finish, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(race_id)
        .bind(&req.name)
        .bind(req.order_index)
        .bind(req.is_start)
        .bind(req.is_finish)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(checkpoint)
    }

    pub async fn find_by_id(&self, checkpoint_id: Uuid) -> Result<Checkpoint> {
        sqlx::query_as::<_, Checkpoint>(
            r#"
            SELECT checkpoint_id, race_id, name, order_index, is_start, is_finish, created_at
            FROM checkpoints WHERE checkpoint_id = ?
            "#,
        )
        .bind(checkpoint_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound("checkpoint"))
    }

    pub async fn list_for_race(&self, race_id: Uuid) -> Result<Vec<Checkpoint>> {
        let checkpoints = sqlx::query_as::<_, Checkpoint>(
            r#"
            SELECT checkpoint_id, race_id, name, order_index, is_start, is_finish, created_at
            FROM checkpoints WHERE race_id = ? ORDER BY order_index
            "#,
        )
        .bind(race_id)
        .fetch_all(self.pool)
        .await?;

        Ok(checkpoints)
    }

    pub async fn find_start(&self, race_id: Uuid) -> Result<Option<Checkpoint>> {
        self.find_flagged(race_id, "is_start").await
    }

    pub async fn find_finish(&self, race_id: Uuid) -> Result<Option<Checkpoint>> {
        self.find_flagged(race_id, "is_finish").await
    }

    async fn find_flagged(&self, race_id: Uuid, flag: &str) -> Result<Option<Checkpoint>> {
        // flag is one of two internal column names, never caller input.
        let sql = format!(
            r#"
            SELECT checkpoint_id, race_id, name, order_index, is_start, is_finish, created_at
            FROM checkpoints WHERE race_id = ? AND {flag} = 1
            ORDER BY order_index LIMIT 1
            "#
        );

        let checkpoint = sqlx::query_as::<_, Checkpoint>(&sql)
            .bind(race_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(checkpoint)
    }

    /// True when the checkpoint exists and belongs to the given race.
    pub async fn belongs_to_race(&self, checkpoint_id: Uuid, race_id: Uuid) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM checkpoints WHERE checkpoint_id = ? AND race_id = ?",
        )
        .bind(checkpoint_id)
        .bind(race_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(found.is_some())
    }
}
