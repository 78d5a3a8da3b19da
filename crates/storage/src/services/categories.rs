use chrono::{Datelike, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{AuditAction, ResultCacheEntry};
use crate::repository::race::RaceRepository;
use crate::repository::result_cache::ResultCacheRepository;
use crate::services::audit::{self, AuditRecord, ENTITY_RESULT_CACHE};

pub const OPEN_CATEGORY: &str = "Open";

/// Age/gender category: uppercased gender plus a fixed age band, e.g.
/// "F 30-39". Missing birth year or gender falls back to "Open".
pub fn derive_category(
    gender: Option<&str>,
    birth_year: Option<i32>,
    current_year: i32,
) -> String {
    let (Some(gender), Some(birth_year)) = (gender, birth_year) else {
        return OPEN_CATEGORY.to_string();
    };

    let age = current_year - birth_year;
    let band = match age {
        i32::MIN..=17 => "U18",
        18..=29 => "18-29",
        30..=39 => "30-39",
        40..=49 => "40-49",
        50..=59 => "50-59",
        _ => "60+",
    };

    format!("{} {}", gender.to_uppercase(), band)
}

#[derive(FromRow)]
struct CategoryRow {
    result_id: Uuid,
    category: Option<String>,
    gender: Option<String>,
    birth_year: Option<i32>,
}

/// Derive and store a category for every cached result in the race.
/// Disqualified entries are left untouched.
pub async fn assign_categories(pool: &SqlitePool, race_id: Uuid) -> Result<u64> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let rows: Vec<CategoryRow> = sqlx::query_as(
        r#"
        SELECT rc.result_id, rc.category, p.gender, p.birth_year
        FROM result_cache rc
        INNER JOIN participants p ON rc.participant_id = p.participant_id
        WHERE rc.race_id = ?
        "#,
    )
    .bind(race_id)
    .fetch_all(pool)
    .await?;

    let current_year = Utc::now().year();
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    let mut count = 0u64;

    for row in &rows {
        if row.category.as_deref() == Some(ResultCacheEntry::DISQUALIFIED) {
            continue;
        }

        let category = derive_category(row.gender.as_deref(), row.birth_year, current_year);

        sqlx::query(
            "UPDATE result_cache SET category = ?, version = version + 1, updated_at = ? WHERE result_id = ?",
        )
        .bind(&category)
        .bind(now)
        .bind(row.result_id)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    audit::record(
        &mut *tx,
        AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Update)
            .after(serde_json::json!({ "categorized": count }))
            .reason("automatic category assignment"),
    )
    .await?;

    tx.commit().await?;

    tracing::debug!(%race_id, count, "categories assigned");

    Ok(count)
}

/// Manually set one participant's category, creating a placeholder cache
/// row when no result exists yet.
pub async fn set_category(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
    category: &str,
) -> Result<ResultCacheEntry> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let existing = ResultCacheRepository::new(pool)
        .find_entry(race_id, participant_id)
        .await?;

    let mut tx = pool.begin().await?;

    let entry = match existing {
        Some(existing) => {
            let updated = sqlx::query_as::<_, ResultCacheEntry>(
                r#"
                UPDATE result_cache SET category = ?, version = version + 1, updated_at = ?
                WHERE result_id = ?
                RETURNING result_id, race_id, participant_id, registration_id, gun_time_ms,
                          chip_time_ms, net_time_ms, place, category, version, updated_at
                "#,
            )
            .bind(category)
            .bind(Utc::now())
            .bind(existing.result_id)
            .fetch_one(&mut *tx)
            .await?;

            audit::record(
                &mut *tx,
                AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Update)
                    .entity(existing.result_id)
                    .before(serde_json::json!({ "category": existing.category }))
                    .after(serde_json::json!({ "category": category })),
            )
            .await?;

            updated
        }
        None => {
            let created = sqlx::query_as::<_, ResultCacheEntry>(
                r#"
                INSERT INTO result_cache (result_id, race_id, participant_id, registration_id,
                                          gun_time_ms, chip_time_ms, net_time_ms, place, category,
                                          version, updated_at)
                VALUES (?, ?, ?, NULL, NULL, NULL, NULL, NULL, ?, 0, ?)
                RETURNING result_id, race_id, participant_id, registration_id, gun_time_ms,
                          chip_time_ms, net_time_ms, place, category, version, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(race_id)
            .bind(participant_id)
            .bind(category)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

            audit::record(
                &mut *tx,
                AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Create)
                    .entity(created.result_id)
                    .after(serde_json::json!({ "category": category })),
            )
            .await?;

            created
        }
    };

    tx.commit().await?;

    Ok(entry)
}

/// Re-rank one category by chip time ascending, independent of the
/// race-wide ranking.
pub async fn recalculate_category_places(
    pool: &SqlitePool,
    race_id: Uuid,
    category: &str,
) -> Result<u64> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let entries = ResultCacheRepository::new(pool)
        .list_for_category(race_id, category)
        .await?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for (index, entry) in entries.iter().enumerate() {
        sqlx::query(
            "UPDATE result_cache SET place = ?, version = version + 1, updated_at = ? WHERE result_id = ?",
        )
        .bind(index as i32 + 1)
        .bind(now)
        .bind(entry.result_id)
        .execute(&mut *tx)
        .await?;
    }

    let count = entries.len() as u64;

    audit::record(
        &mut *tx,
        AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Update)
            .after(serde_json::json!({ "category": category, "ranked": count }))
            .reason("category place recalculation"),
    )
    .await?;

    tx.commit().await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_age_bands() {
        assert_eq!(derive_category(Some("m"), Some(2010), 2026), "M U18");
        assert_eq!(derive_category(Some("F"), Some(2000), 2026), "F 18-29");
        assert_eq!(derive_category(Some("f"), Some(1990), 2026), "F 30-39");
        assert_eq!(derive_category(Some("M"), Some(1980), 2026), "M 40-49");
        assert_eq!(derive_category(Some("M"), Some(1970), 2026), "M 50-59");
        assert_eq!(derive_category(Some("F"), Some(1950), 2026), "F 60+");
    }

    #[test]
    fn missing_demographics_fall_back_to_open() {
        assert_eq!(derive_category(None, Some(1990), 2026), "Open");
        assert_eq!(derive_category(Some("M"), None, 2026), "Open");
        assert_eq!(derive_category(None, None, 2026), "Open");
    }
}
