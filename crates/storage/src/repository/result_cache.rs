use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::ResultCacheEntry;

const COLUMNS: &str = "result_id, race_id, participant_id, registration_id, gun_time_ms, \
     chip_time_ms, net_time_ms, place, category, version, updated_at";

pub struct ResultCacheRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResultCacheRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_entry(
        &self,
        race_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<ResultCacheEntry>> {
        let entry = sqlx::query_as::<_, ResultCacheEntry>(&format!(
            "SELECT {COLUMNS} FROM result_cache WHERE race_id = ? AND participant_id = ?"
        ))
        .bind(race_id)
        .bind(participant_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn list_for_race(&self, race_id: Uuid) -> Result<Vec<ResultCacheEntry>> {
        let entries = sqlx::query_as::<_, ResultCacheEntry>(&format!(
            r#"
            SELECT {COLUMNS} FROM result_cache WHERE race_id = ?
            ORDER BY place IS NULL, place
            "#
        ))
        .bind(race_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Rankable entries within one category, ascending by chip time.
    pub async fn list_for_category(
        &self,
        race_id: Uuid,
        category: &str,
    ) -> Result<Vec<ResultCacheEntry>> {
        let entries = sqlx::query_as::<_, ResultCacheEntry>(&format!(
            r#"
            SELECT {COLUMNS} FROM result_cache
            WHERE race_id = ? AND category = ? AND chip_time_ms IS NOT NULL
            ORDER BY chip_time_ms, result_id
            "#
        ))
        .bind(race_id)
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
