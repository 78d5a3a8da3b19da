use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{AuditAction, ResultCacheEntry};
use crate::repository::race::RaceRepository;
use crate::repository::result_cache::ResultCacheRepository;
use crate::services::audit::{self, AuditRecord, ENTITY_RESULT_CACHE};
use crate::services::categories::OPEN_CATEGORY;

const ENTRY_COLUMNS: &str = "result_id, race_id, participant_id, registration_id, gun_time_ms, \
     chip_time_ms, net_time_ms, place, category, version, updated_at";

async fn find_existing_result(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
) -> Result<ResultCacheEntry> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    ResultCacheRepository::new(pool)
        .find_entry(race_id, participant_id)
        .await?
        .ok_or(StorageError::NotFound("result"))
}

fn concurrent_edit() -> StorageError {
    StorageError::Conflict("result was modified concurrently".to_string())
}

/// Apply a signed millisecond adjustment to chip and net time. The
/// adjustment is also appended to the ledger so a later full recompute
/// re-applies it instead of discarding it. The row update is optimistic:
/// it only lands if the entry is unchanged since it was read.
pub async fn adjust_time(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
    adjustment_ms: i64,
    reason: &str,
    user_id: Option<&str>,
) -> Result<ResultCacheEntry> {
    if reason.trim().is_empty() {
        return Err(StorageError::validation("a reason is required"));
    }

    let existing = find_existing_result(pool, race_id, participant_id).await?;

    let new_chip = existing.chip_time_ms.map(|t| t + adjustment_ms);
    let new_net = existing.net_time_ms.map(|t| t + adjustment_ms);

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, ResultCacheEntry>(&format!(
        r#"
        UPDATE result_cache
        SET chip_time_ms = ?, net_time_ms = ?, version = version + 1, updated_at = ?
        WHERE result_id = ? AND version = ?
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(new_chip)
    .bind(new_net)
    .bind(Utc::now())
    .bind(existing.result_id)
    .bind(existing.version)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(concurrent_edit)?;

    sqlx::query(
        r#"
        INSERT INTO result_adjustments (adjustment_id, race_id, participant_id, adjustment_ms, reason, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(race_id)
    .bind(participant_id)
    .bind(adjustment_ms)
    .bind(reason)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    audit::record(
        &mut *tx,
        AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Update)
            .entity(existing.result_id)
            .user(user_id)
            .before(serde_json::json!({
                "chipTimeMs": existing.chip_time_ms,
                "netTimeMs": existing.net_time_ms,
            }))
            .after(serde_json::json!({
                "chipTimeMs": updated.chip_time_ms,
                "netTimeMs": updated.net_time_ms,
            }))
            .reason(reason),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(%race_id, %participant_id, adjustment_ms, "result time adjusted");

    Ok(updated)
}

/// Time penalty in whole seconds, always added.
pub async fn add_penalty(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
    penalty_seconds: i64,
    reason: &str,
    user_id: Option<&str>,
) -> Result<ResultCacheEntry> {
    if penalty_seconds <= 0 {
        return Err(StorageError::validation("penalty must be positive"));
    }

    let reason = format!("PENALTY {penalty_seconds}s: {reason}");
    adjust_time(pool, race_id, participant_id, penalty_seconds * 1000, &reason, user_id).await
}

/// Mark the participant disqualified: category becomes "DQ" and the place
/// is cleared. Times are left intact for the record.
pub async fn disqualify(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
    reason: &str,
    user_id: Option<&str>,
) -> Result<ResultCacheEntry> {
    if reason.trim().is_empty() {
        return Err(StorageError::validation("a reason is required"));
    }

    let existing = find_existing_result(pool, race_id, participant_id).await?;

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, ResultCacheEntry>(&format!(
        r#"
        UPDATE result_cache
        SET category = ?, place = NULL, version = version + 1, updated_at = ?
        WHERE result_id = ? AND version = ?
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(ResultCacheEntry::DISQUALIFIED)
    .bind(Utc::now())
    .bind(existing.result_id)
    .bind(existing.version)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(concurrent_edit)?;

    audit::record(
        &mut *tx,
        AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Update)
            .entity(existing.result_id)
            .user(user_id)
            .before(serde_json::json!({
                "category": existing.category,
                "place": existing.place,
            }))
            .after(serde_json::json!({
                "category": ResultCacheEntry::DISQUALIFIED,
                "place": null,
            }))
            .reason(format!("DISQUALIFIED: {reason}")),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(%race_id, %participant_id, "participant disqualified");

    Ok(updated)
}

/// Lift a disqualification. The place stays empty until the next recompute
/// or category recalculation restores a rank.
pub async fn reinstate(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
    category: Option<&str>,
    user_id: Option<&str>,
) -> Result<ResultCacheEntry> {
    let existing = find_existing_result(pool, race_id, participant_id).await?;

    if !existing.is_disqualified() {
        return Err(StorageError::invalid_state("participant is not disqualified"));
    }

    let category = category.unwrap_or(OPEN_CATEGORY);

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, ResultCacheEntry>(&format!(
        r#"
        UPDATE result_cache
        SET category = ?, version = version + 1, updated_at = ?
        WHERE result_id = ? AND version = ?
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(category)
    .bind(Utc::now())
    .bind(existing.result_id)
    .bind(existing.version)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(concurrent_edit)?;

    audit::record(
        &mut *tx,
        AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Update)
            .entity(existing.result_id)
            .user(user_id)
            .before(serde_json::json!({
                "category": ResultCacheEntry::DISQUALIFIED,
                "place": null,
            }))
            .after(serde_json::json!({
                "category": category,
                "place": null,
            }))
            .reason("Participant reinstated"),
    )
    .await?;

    tx.commit().await?;

    Ok(updated)
}
