use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::dto::timing::{
    BulkTimingEventItem, RecordBulkTimingEventsRequest, RecordTimingEventRequest,
    UpdateTimingEventRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{AuditAction, TimingEvent};
use crate::repository::checkpoint::CheckpointRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::race::RaceRepository;
use crate::repository::timing_event::TimingEventRepository;
use crate::services::audit::{self, AuditRecord, ENTITY_TIMING_EVENT};
use crate::services::events::RaceEvents;

const EVENT_COLUMNS: &str = "event_id, race_id, participant_id, checkpoint_id, registration_id, \
     timing_session_id, time_ms, elapsed_ms, sequence, device_ts, source, qualifier, \
     deleted, created_at";

/// Elapsed time of an event relative to the participant's start.
///
/// No start checkpoint on the race, or no start event yet for the
/// participant, yields `None`. An event at the start checkpoint itself is
/// elapsed zero.
pub async fn compute_elapsed(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
    checkpoint_id: Uuid,
    time_ms: i64,
) -> Result<Option<i64>> {
    let Some(start) = CheckpointRepository::new(pool).find_start(race_id).await? else {
        return Ok(None);
    };

    if start.checkpoint_id == checkpoint_id {
        return Ok(Some(0));
    }

    let start_event = TimingEventRepository::new(pool)
        .earliest_at_checkpoint(race_id, participant_id, start.checkpoint_id)
        .await?;

    Ok(start_event.map(|e| time_ms - e.time_ms))
}

/// Cross-entity checks that must pass before a sequence number is spent.
async fn validate_event_refs(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
    checkpoint_id: Uuid,
) -> Result<()> {
    if !CheckpointRepository::new(pool)
        .belongs_to_race(checkpoint_id, race_id)
        .await?
    {
        return Err(StorageError::Validation(format!(
            "checkpoint {checkpoint_id} does not belong to this race"
        )));
    }

    if !ParticipantRepository::new(pool)
        .belongs_to_race(participant_id, race_id)
        .await?
    {
        return Err(StorageError::Validation(format!(
            "participant {participant_id} is not registered for this race"
        )));
    }

    Ok(())
}

/// Bump the per-race counter by `count` inside the ingestion transaction
/// and return the first sequence of the allocated block. A single UPSERT
/// statement, so two concurrent ingestions can never receive overlapping
/// blocks; a rollback returns the numbers.
async fn allocate_sequences(
    tx: &mut Transaction<'_, Sqlite>,
    race_id: Uuid,
    count: i64,
) -> Result<i64> {
    let last: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO race_sequences (race_id, last_sequence) VALUES (?, ?)
        ON CONFLICT (race_id) DO UPDATE SET last_sequence = last_sequence + excluded.last_sequence
        RETURNING last_sequence
        "#,
    )
    .bind(race_id)
    .bind(count)
    .fetch_one(&mut **tx)
    .await?;

    Ok(last - count + 1)
}

struct PreparedEvent {
    item: BulkTimingEventItem,
    elapsed_ms: Option<i64>,
}

async fn insert_event(
    tx: &mut Transaction<'_, Sqlite>,
    race_id: Uuid,
    timing_session_id: Option<Uuid>,
    sequence: i64,
    prepared: &PreparedEvent,
) -> Result<TimingEvent> {
    let event = sqlx::query_as::<_, TimingEvent>(&format!(
        r#"
        INSERT INTO timing_events (event_id, race_id, participant_id, checkpoint_id,
                                   registration_id, timing_session_id, time_ms, elapsed_ms,
                                   sequence, device_ts, source, qualifier, deleted, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        RETURNING {EVENT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(race_id)
    .bind(prepared.item.participant_id)
    .bind(prepared.item.checkpoint_id)
    .bind(prepared.item.registration_id)
    .bind(timing_session_id)
    .bind(prepared.item.time_ms)
    .bind(prepared.elapsed_ms)
    .bind(sequence)
    .bind(prepared.item.device_ts)
    .bind(&prepared.item.source)
    .bind(&prepared.item.qualifier)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    audit::record(
        &mut **tx,
        AuditRecord::new(race_id, ENTITY_TIMING_EVENT, AuditAction::Create)
            .entity(event.event_id)
            .after(serde_json::to_value(&event).unwrap_or_default()),
    )
    .await?;

    Ok(event)
}

/// Record a single timing event: validate, compute elapsed, then allocate
/// the next sequence and insert atomically.
pub async fn record_event(
    pool: &SqlitePool,
    events: &dyn RaceEvents,
    race_id: Uuid,
    req: &RecordTimingEventRequest,
) -> Result<TimingEvent> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }
    validate_event_refs(pool, race_id, req.participant_id, req.checkpoint_id).await?;

    let elapsed_ms =
        compute_elapsed(pool, race_id, req.participant_id, req.checkpoint_id, req.time_ms).await?;

    let prepared = PreparedEvent {
        item: BulkTimingEventItem {
            participant_id: req.participant_id,
            checkpoint_id: req.checkpoint_id,
            registration_id: req.registration_id,
            time_ms: req.time_ms,
            device_ts: req.device_ts,
            source: req.source.clone(),
            qualifier: req.qualifier.clone(),
        },
        elapsed_ms,
    };

    let mut tx = pool.begin().await?;
    let sequence = allocate_sequences(&mut tx, race_id, 1).await?;
    let event = insert_event(&mut tx, race_id, req.timing_session_id, sequence, &prepared).await?;
    tx.commit().await?;

    tracing::debug!(%race_id, sequence, "timing event recorded");
    events.on_timing_event_recorded(race_id, event.event_id, event.sequence);

    Ok(event)
}

/// Record an ordered batch of events for one race. Every element is
/// validated before anything is written; the whole batch commits or none
/// of it does. Sequences form a contiguous block in submission order.
/// Elapsed times are computed against already-committed events only.
pub async fn record_bulk(
    pool: &SqlitePool,
    events: &dyn RaceEvents,
    race_id: Uuid,
    req: &RecordBulkTimingEventsRequest,
) -> Result<Vec<TimingEvent>> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }
    if req.events.is_empty() {
        return Err(StorageError::validation("bulk request contains no events"));
    }

    let mut prepared = Vec::with_capacity(req.events.len());
    for item in &req.events {
        validate_event_refs(pool, race_id, item.participant_id, item.checkpoint_id).await?;
        let elapsed_ms =
            compute_elapsed(pool, race_id, item.participant_id, item.checkpoint_id, item.time_ms)
                .await?;
        prepared.push(PreparedEvent {
            item: item.clone(),
            elapsed_ms,
        });
    }

    let mut tx = pool.begin().await?;
    let first = allocate_sequences(&mut tx, race_id, prepared.len() as i64).await?;

    let mut created = Vec::with_capacity(prepared.len());
    for (offset, p) in prepared.iter().enumerate() {
        let event =
            insert_event(&mut tx, race_id, req.timing_session_id, first + offset as i64, p).await?;
        created.push(event);
    }
    tx.commit().await?;

    tracing::info!(%race_id, count = created.len(), first_sequence = first, "bulk timing events recorded");
    for event in &created {
        events.on_timing_event_recorded(race_id, event.event_id, event.sequence);
    }

    Ok(created)
}

/// Patch a timing event. A changed `time_ms` recomputes the elapsed time
/// before persisting; sequence is never touched.
pub async fn update_event(
    pool: &SqlitePool,
    event_id: Uuid,
    req: &UpdateTimingEventRequest,
) -> Result<TimingEvent> {
    let existing = TimingEventRepository::new(pool).find_by_id(event_id).await?;

    let time_ms = req.time_ms.unwrap_or(existing.time_ms);
    let elapsed_ms = match (req.time_ms, existing.checkpoint_id) {
        (Some(new_time), Some(checkpoint_id)) => {
            compute_elapsed(pool, existing.race_id, existing.participant_id, checkpoint_id, new_time)
                .await?
        }
        _ => existing.elapsed_ms,
    };

    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, TimingEvent>(&format!(
        r#"
        UPDATE timing_events
        SET time_ms = ?, elapsed_ms = ?, device_ts = ?, source = ?, qualifier = ?
        WHERE event_id = ?
        RETURNING {EVENT_COLUMNS}
        "#
    ))
    .bind(time_ms)
    .bind(elapsed_ms)
    .bind(req.device_ts.or(existing.device_ts))
    .bind(req.source.as_ref().or(existing.source.as_ref()))
    .bind(req.qualifier.as_ref().or(existing.qualifier.as_ref()))
    .bind(event_id)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(
        &mut *tx,
        AuditRecord::new(existing.race_id, ENTITY_TIMING_EVENT, AuditAction::Update)
            .entity(event_id)
            .before(serde_json::to_value(&existing).unwrap_or_default())
            .after(serde_json::to_value(&updated).unwrap_or_default()),
    )
    .await?;

    tx.commit().await?;

    Ok(updated)
}

/// Soft delete: the row stays, sequence history stays, computation ignores
/// it. Deleting twice is an error so the audit trail keeps its meaning.
pub async fn soft_delete_event(pool: &SqlitePool, event_id: Uuid) -> Result<TimingEvent> {
    let existing = TimingEventRepository::new(pool).find_by_id(event_id).await?;
    if existing.deleted {
        return Err(StorageError::invalid_state("timing event already deleted"));
    }

    let mut tx = pool.begin().await?;

    let deleted = sqlx::query_as::<_, TimingEvent>(&format!(
        "UPDATE timing_events SET deleted = 1 WHERE event_id = ? RETURNING {EVENT_COLUMNS}"
    ))
    .bind(event_id)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(
        &mut *tx,
        AuditRecord::new(existing.race_id, ENTITY_TIMING_EVENT, AuditAction::Delete)
            .entity(event_id)
            .before(serde_json::to_value(&existing).unwrap_or_default()),
    )
    .await?;

    tx.commit().await?;

    Ok(deleted)
}

pub async fn undo_delete_event(pool: &SqlitePool, event_id: Uuid) -> Result<TimingEvent> {
    let existing = TimingEventRepository::new(pool).find_by_id(event_id).await?;
    if !existing.deleted {
        return Err(StorageError::invalid_state("timing event is not deleted"));
    }

    let mut tx = pool.begin().await?;

    let restored = sqlx::query_as::<_, TimingEvent>(&format!(
        "UPDATE timing_events SET deleted = 0 WHERE event_id = ? RETURNING {EVENT_COLUMNS}"
    ))
    .bind(event_id)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(
        &mut *tx,
        AuditRecord::new(existing.race_id, ENTITY_TIMING_EVENT, AuditAction::Undo)
            .entity(event_id)
            .after(serde_json::to_value(&restored).unwrap_or_default()),
    )
    .await?;

    tx.commit().await?;

    Ok(restored)
}

/// Recompute elapsed times for all of a participant's non-deleted events in
/// ascending recorded-time order. Used after a historical correction moves
/// the start time.
pub async fn recalculate_times(
    pool: &SqlitePool,
    race_id: Uuid,
    participant_id: Uuid,
) -> Result<u64> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }
    if !ParticipantRepository::new(pool)
        .belongs_to_race(participant_id, race_id)
        .await?
    {
        return Err(StorageError::Validation(format!(
            "participant {participant_id} is not registered for this race"
        )));
    }

    let repo = TimingEventRepository::new(pool);
    let events = repo.list_for_participant(race_id, participant_id).await?;

    let mut count = 0u64;
    for event in &events {
        let Some(checkpoint_id) = event.checkpoint_id else {
            continue;
        };
        let elapsed_ms =
            compute_elapsed(pool, race_id, participant_id, checkpoint_id, event.time_ms).await?;
        repo.set_elapsed(event.event_id, elapsed_ms).await?;
        count += 1;
    }

    audit::record(
        pool,
        AuditRecord::new(race_id, ENTITY_TIMING_EVENT, AuditAction::Update)
            .after(serde_json::json!({ "recalculated": count }))
            .reason("elapsed time recalculation"),
    )
    .await?;

    tracing::debug!(%race_id, %participant_id, count, "elapsed times recalculated");

    Ok(count)
}
