use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::dto::results::LeaderboardEntry;
use crate::error::{Result, StorageError};
use crate::models::{AuditAction, ResultCacheEntry};
use crate::repository::adjustment::AdjustmentRepository;
use crate::repository::checkpoint::CheckpointRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::race::RaceRepository;
use crate::repository::registration::RegistrationRepository;
use crate::repository::result_cache::ResultCacheRepository;
use crate::repository::timing_event::TimingEventRepository;
use crate::services::audit::{self, AuditRecord, ENTITY_RESULT_CACHE};
use crate::services::events::RaceEvents;

struct ComputedResult {
    participant_id: Uuid,
    registration_id: Option<Uuid>,
    gun_time_ms: Option<i64>,
    chip_time_ms: Option<i64>,
    net_time_ms: Option<i64>,
    place: Option<i32>,
    category: Option<String>,
}

/// Rebuild the result cache for a race from the timing event log.
///
/// The replacement is a full atomic swap: old rows are deleted and new rows
/// inserted inside one transaction, so concurrent readers see either the
/// previous complete leaderboard or the new one. Manual corrections live
/// in the adjustment ledger and the preserved `category`, and are
/// re-applied here, so recompute never discards them.
pub async fn refresh_results(
    pool: &SqlitePool,
    events: &dyn RaceEvents,
    race_id: Uuid,
) -> Result<u64> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let checkpoints = CheckpointRepository::new(pool);
    let start = checkpoints
        .find_start(race_id)
        .await?
        .ok_or_else(|| StorageError::validation("race has no start checkpoint configured"))?;
    let finish = checkpoints
        .find_finish(race_id)
        .await?
        .ok_or_else(|| StorageError::validation("race has no finish checkpoint configured"))?;

    let participants = ParticipantRepository::new(pool).list_for_race(race_id).await?;

    // Prior categories survive the swap; they carry manual assignment and DQ.
    let prior_categories: std::collections::HashMap<Uuid, Option<String>> =
        ResultCacheRepository::new(pool)
            .list_for_race(race_id)
            .await?
            .into_iter()
            .map(|e| (e.participant_id, e.category))
            .collect();

    let adjustment_totals = AdjustmentRepository::new(pool).totals_for_race(race_id).await?;

    let event_repo = TimingEventRepository::new(pool);
    let registration_repo = RegistrationRepository::new(pool);

    // Participants arrive in creation order, the documented tie-break for
    // equal chip times.
    let mut results = Vec::with_capacity(participants.len());
    for participant in &participants {
        let registration_id = registration_repo
            .find_for_participant(participant.participant_id)
            .await?
            .map(|r| r.registration_id);

        let finish_event = event_repo
            .earliest_at_checkpoint(race_id, participant.participant_id, finish.checkpoint_id)
            .await?;

        let category = prior_categories
            .get(&participant.participant_id)
            .cloned()
            .flatten();

        let mut result = match finish_event {
            None => ComputedResult {
                participant_id: participant.participant_id,
                registration_id,
                gun_time_ms: None,
                chip_time_ms: None,
                net_time_ms: None,
                place: None,
                category,
            },
            Some(finish_event) => {
                let start_event = event_repo
                    .earliest_at_checkpoint(
                        race_id,
                        participant.participant_id,
                        start.checkpoint_id,
                    )
                    .await?;

                let gun_time_ms = finish_event.elapsed_ms;
                let chip_time_ms = match start_event {
                    Some(start_event) => Some(finish_event.time_ms - start_event.time_ms),
                    None => gun_time_ms,
                };

                ComputedResult {
                    participant_id: participant.participant_id,
                    registration_id,
                    gun_time_ms,
                    chip_time_ms,
                    net_time_ms: chip_time_ms,
                    place: None,
                    category,
                }
            }
        };

        if let Some(adjustment) = adjustment_totals.get(&participant.participant_id) {
            result.chip_time_ms = result.chip_time_ms.map(|t| t + adjustment);
            result.net_time_ms = result.net_time_ms.map(|t| t + adjustment);
        }

        results.push(result);
    }

    assign_places(&mut results);

    let count = results.len() as u64;
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM result_cache WHERE race_id = ?")
        .bind(race_id)
        .execute(&mut *tx)
        .await?;

    for result in &results {
        sqlx::query(
            r#"
            INSERT INTO result_cache (result_id, race_id, participant_id, registration_id,
                                      gun_time_ms, chip_time_ms, net_time_ms, place, category,
                                      version, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(race_id)
        .bind(result.participant_id)
        .bind(result.registration_id)
        .bind(result.gun_time_ms)
        .bind(result.chip_time_ms)
        .bind(result.net_time_ms)
        .bind(result.place)
        .bind(&result.category)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    audit::record(
        &mut *tx,
        AuditRecord::new(race_id, ENTITY_RESULT_CACHE, AuditAction::Update)
            .after(serde_json::json!({ "refreshed": count }))
            .reason("full results recompute"),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(%race_id, count, "race results recomputed");
    events.on_results_recomputed(race_id, count);

    Ok(count)
}

/// Rank finishers by chip time ascending, place starting at 1.
/// Disqualified entries keep their times but never a place. The input
/// order (participant creation order) breaks ties; the sort is stable.
fn assign_places(results: &mut [ComputedResult]) {
    let mut ranked: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            r.chip_time_ms.is_some() && r.category.as_deref() != Some(ResultCacheEntry::DISQUALIFIED)
        })
        .map(|(i, _)| i)
        .collect();

    ranked.sort_by_key(|&i| results[i].chip_time_ms);

    for (rank, &i) in ranked.iter().enumerate() {
        results[i].place = Some(rank as i32 + 1);
    }
}

#[derive(FromRow)]
struct LeaderboardRow {
    place: Option<i32>,
    participant_id: Uuid,
    bib: Option<String>,
    first_name: String,
    last_name: String,
    category: Option<String>,
    gun_time_ms: Option<i64>,
    chip_time_ms: Option<i64>,
    net_time_ms: Option<i64>,
}

/// Ranked leaderboard from the cache, optionally narrowed to one category.
pub async fn leaderboard(
    pool: &SqlitePool,
    race_id: Uuid,
    category: Option<&str>,
) -> Result<Vec<LeaderboardEntry>> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let mut query = sqlx::QueryBuilder::new(
        r#"
        SELECT rc.place, rc.participant_id, r.bib, p.first_name, p.last_name,
               rc.category, rc.gun_time_ms, rc.chip_time_ms, rc.net_time_ms
        FROM result_cache rc
        INNER JOIN participants p ON rc.participant_id = p.participant_id
        LEFT JOIN registrations r ON rc.registration_id = r.registration_id
        WHERE rc.race_id =
        "#,
    );
    query.push_bind(race_id);
    query.push(" AND rc.chip_time_ms IS NOT NULL");

    if let Some(category) = category {
        query.push(" AND rc.category = ");
        query.push_bind(category);
    }

    query.push(" ORDER BY rc.place IS NULL, rc.place, rc.chip_time_ms");

    let rows: Vec<LeaderboardRow> = query.build_query_as().fetch_all(pool).await?;

    let entries = rows
        .into_iter()
        .map(|row| LeaderboardEntry {
            place: row.place,
            participant_id: row.participant_id,
            bib: row.bib,
            first_name: row.first_name,
            last_name: row.last_name,
            category: row.category,
            gun_time_ms: row.gun_time_ms,
            chip_time_ms: row.chip_time_ms,
            net_time_ms: row.net_time_ms,
            gun_time: row.gun_time_ms.map(format_time),
            chip_time: row.chip_time_ms.map(format_time),
            net_time: row.net_time_ms.map(format_time),
        })
        .collect();

    Ok(entries)
}

/// Milliseconds to `HH:MM:SS.mmm`.
pub fn format_time(time_ms: i64) -> String {
    let hours = time_ms / 3_600_000;
    let minutes = (time_ms % 3_600_000) / 60_000;
    let seconds = (time_ms % 60_000) / 1_000;
    let millis = time_ms % 1_000;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_hours() {
        assert_eq!(format_time(3_600_000), "01:00:00.000");
    }

    #[test]
    fn formats_mixed_components() {
        assert_eq!(format_time(3_699_000), "01:01:39.000");
        assert_eq!(format_time(59_999), "00:00:59.999");
        assert_eq!(format_time(0), "00:00:00.000");
    }

    #[test]
    fn places_skip_disqualified_and_unfinished() {
        let mut results = vec![
            ComputedResult {
                participant_id: Uuid::new_v4(),
                registration_id: None,
                gun_time_ms: Some(2_000),
                chip_time_ms: Some(2_000),
                net_time_ms: Some(2_000),
                place: None,
                category: None,
            },
            ComputedResult {
                participant_id: Uuid::new_v4(),
                registration_id: None,
                gun_time_ms: Some(1_000),
                chip_time_ms: Some(1_000),
                net_time_ms: Some(1_000),
                place: None,
                category: Some("DQ".to_string()),
            },
            ComputedResult {
                participant_id: Uuid::new_v4(),
                registration_id: None,
                gun_time_ms: None,
                chip_time_ms: None,
                net_time_ms: None,
                place: None,
                category: None,
            },
            ComputedResult {
                participant_id: Uuid::new_v4(),
                registration_id: None,
                gun_time_ms: Some(1_500),
                chip_time_ms: Some(1_500),
                net_time_ms: Some(1_500),
                place: None,
                category: Some("Open".to_string()),
            },
        ];

        assign_places(&mut results);

        assert_eq!(results[0].place, Some(2));
        assert_eq!(results[1].place, None);
        assert_eq!(results[2].place, None);
        assert_eq!(results[3].place, Some(1));
    }

    #[test]
    fn ties_keep_input_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut results = vec![
            ComputedResult {
                participant_id: first,
                registration_id: None,
                gun_time_ms: Some(5_000),
                chip_time_ms: Some(5_000),
                net_time_ms: Some(5_000),
                place: None,
                category: None,
            },
            ComputedResult {
                participant_id: second,
                registration_id: None,
                gun_time_ms: Some(5_000),
                chip_time_ms: Some(5_000),
                net_time_ms: Some(5_000),
                place: None,
                category: None,
            },
        ];

        assign_places(&mut results);

        assert_eq!(results[0].place, Some(1));
        assert_eq!(results[1].place, Some(2));
    }
}
