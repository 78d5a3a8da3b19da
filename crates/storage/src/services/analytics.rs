use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::dto::analytics::{CheckpointStatistics, RaceStatistics, SplitTime};
use crate::error::{Result, StorageError};
use crate::repository::checkpoint::CheckpointRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::race::RaceRepository;
use crate::repository::result_cache::ResultCacheRepository;
use crate::repository::timing_event::TimingEventRepository;

/// Finisher/DNF/DQ counts and aggregate chip times for a race, read from
/// the result cache. A participant counts as a finisher when the cached
/// chip time is present and the entry is not disqualified; everyone else
/// who is neither a finisher nor disqualified is a DNF.
pub async fn race_statistics(pool: &SqlitePool, race_id: Uuid) -> Result<RaceStatistics> {
    let races = RaceRepository::new(pool);
    if !races.exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let total_participants = races.participant_count(race_id).await?;
    let entries = ResultCacheRepository::new(pool).list_for_race(race_id).await?;

    let total_dq = entries.iter().filter(|e| e.is_disqualified()).count() as i64;

    let finish_times: Vec<i64> = entries
        .iter()
        .filter(|e| !e.is_disqualified())
        .filter_map(|e| e.chip_time_ms)
        .collect();
    let total_finishers = finish_times.len() as i64;

    Ok(RaceStatistics {
        total_participants,
        total_finishers,
        total_dnf: total_participants - total_finishers - total_dq,
        total_dq,
        average_time_seconds: (!finish_times.is_empty()).then(|| {
            finish_times.iter().sum::<i64>() as f64 / finish_times.len() as f64 / 1000.0
        }),
        fastest_time_seconds: finish_times.iter().min().map(|&t| t as f64 / 1000.0),
        slowest_time_seconds: finish_times.iter().max().map(|&t| t as f64 / 1000.0),
    })
}

/// Per-checkpoint traffic in course order: event count, mean elapsed
/// time, and events per hour between the first and last reading.
pub async fn checkpoint_statistics(
    pool: &SqlitePool,
    race_id: Uuid,
) -> Result<Vec<CheckpointStatistics>> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let checkpoints = CheckpointRepository::new(pool).list_for_race(race_id).await?;
    let event_repo = TimingEventRepository::new(pool);

    let mut stats = Vec::with_capacity(checkpoints.len());
    for checkpoint in checkpoints {
        let events = event_repo
            .list_at_checkpoint(race_id, checkpoint.checkpoint_id)
            .await?;

        let elapsed: Vec<i64> = events.iter().filter_map(|e| e.elapsed_ms).collect();
        let average_elapsed_seconds = (!elapsed.is_empty())
            .then(|| elapsed.iter().sum::<i64>() as f64 / elapsed.len() as f64 / 1000.0);

        // Events are time-ascending, so first/last bound the window.
        let throughput_per_hour = match (events.first(), events.last()) {
            (Some(first), Some(last)) if last.time_ms > first.time_ms => {
                let duration_hours = (last.time_ms - first.time_ms) as f64 / 3_600_000.0;
                Some(events.len() as f64 / duration_hours)
            }
            _ => None,
        };

        stats.push(CheckpointStatistics {
            checkpoint_id: checkpoint.checkpoint_id,
            checkpoint_name: checkpoint.name,
            total_events: events.len() as i64,
            average_elapsed_seconds,
            throughput_per_hour,
        });
    }

    Ok(stats)
}

#[derive(FromRow)]
struct SplitRow {
    checkpoint_id: Option<Uuid>,
    checkpoint_name: Option<String>,
    order_index: Option<i32>,
    time_ms: i64,
    elapsed_ms: Option<i64>,
}

/// A participant's non-deleted events joined with their checkpoints, in
/// course order (checkpoint-less events sort last).
pub async fn participant_splits(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
) -> Result<Vec<SplitTime>> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }
    if !ParticipantRepository::new(pool)
        .belongs_to_race(participant_id, race_id)
        .await?
    {
        return Err(StorageError::NotFound("participant"));
    }

    let rows: Vec<SplitRow> = sqlx::query_as(
        r#"
        SELECT te.checkpoint_id, c.name AS checkpoint_name, c.order_index,
               te.time_ms, te.elapsed_ms
        FROM timing_events te
        LEFT JOIN checkpoints c ON te.checkpoint_id = c.checkpoint_id
        WHERE te.race_id = ? AND te.participant_id = ? AND te.deleted = 0
        ORDER BY c.order_index IS NULL, c.order_index, te.time_ms
        "#,
    )
    .bind(race_id)
    .bind(participant_id)
    .fetch_all(pool)
    .await?;

    let splits = rows
        .into_iter()
        .map(|row| SplitTime {
            checkpoint_id: row.checkpoint_id,
            checkpoint_name: row.checkpoint_name,
            order_index: row.order_index,
            time_ms: row.time_ms,
            elapsed_ms: row.elapsed_ms,
        })
        .collect();

    Ok(splits)
}
