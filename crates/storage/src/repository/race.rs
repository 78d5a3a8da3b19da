use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dto::race::CreateRaceRequest;
use crate::error::{Result, StorageError};
use crate::models::Race;

pub struct RaceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RaceRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &CreateRaceRequest) -> Result<Race> {
        let race_id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let race = sqlx::query_as::<_, Race>(
            r#"
            INSERT INTO races (race_id, name, start_at, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING race_id, name, start_at, created_at
            "#,
        )
        .bind(race_id)
        .bind(&req.name)
        .bind(req.start_at)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // Seed the sequence counter so allocation is a plain UPDATE later.
        sqlx::query("INSERT INTO race_sequences (race_id, last_sequence) VALUES (?, 0)")
            .bind(race_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(race)
    }

    pub async fn list(&self) -> Result<Vec<Race>> {
        let races = sqlx::query_as::<_, Race>(
            "SELECT race_id, name, start_at, created_at FROM races ORDER BY created_at",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(races)
    }

    pub async fn find_by_id(&self, race_id: Uuid) -> Result<Race> {
        sqlx::query_as::<_, Race>(
            "SELECT race_id, name, start_at, created_at FROM races WHERE race_id = ?",
        )
        .bind(race_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound("race"))
    }

    pub async fn exists(&self, race_id: Uuid) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM races WHERE race_id = ?")
            .bind(race_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(found.is_some())
    }

    pub async fn participant_count(&self, race_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE race_id = ?")
                .bind(race_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
