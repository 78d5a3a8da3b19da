mod common;

use common::*;
use storage::dto::timing::UpdateTimingEventRequest;
use storage::models::AuditAction;
use storage::services::events::NoopRaceEvents;
use storage::services::{adjustments, audit, results, timing};

#[tokio::test]
async fn every_event_mutation_appends_one_entry() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, _) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    let event = timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(runner.participant_id, start.checkpoint_id, 1_000),
    )
    .await
    .unwrap();
    timing::update_event(
        db.pool(),
        event.event_id,
        &UpdateTimingEventRequest {
            time_ms: Some(2_000),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    timing::soft_delete_event(db.pool(), event.event_id).await.unwrap();
    timing::undo_delete_event(db.pool(), event.event_id).await.unwrap();

    let history = audit::entity_history(db.pool(), "TimingEvent", event.event_id)
        .await
        .unwrap();

    // Newest first.
    let actions: Vec<AuditAction> = history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Undo,
            AuditAction::Delete,
            AuditAction::Update,
            AuditAction::Create,
        ]
    );
}

#[tokio::test]
async fn update_entries_carry_before_and_after() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, _) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    let event = timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(runner.participant_id, start.checkpoint_id, 1_000),
    )
    .await
    .unwrap();
    timing::update_event(
        db.pool(),
        event.event_id,
        &UpdateTimingEventRequest {
            time_ms: Some(2_000),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let history = audit::entity_history(db.pool(), "TimingEvent", event.event_id)
        .await
        .unwrap();
    let update = &history[0];

    let before: serde_json::Value =
        serde_json::from_str(update.before_state.as_deref().unwrap()).unwrap();
    let after: serde_json::Value =
        serde_json::from_str(update.after_state.as_deref().unwrap()).unwrap();
    assert_eq!(before["time_ms"], 1_000);
    assert_eq!(after["time_ms"], 2_000);
}

#[tokio::test]
async fn adjustment_entries_carry_operator_and_reason() {
    let db = setup().await;
    let race = create_race(&db, "City Marathon").await;
    let (start, finish) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(runner.participant_id, start.checkpoint_id, 1_000),
    )
    .await
    .unwrap();
    timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(runner.participant_id, finish.checkpoint_id, 3_700_000),
    )
    .await
    .unwrap();
    results::refresh_results(db.pool(), &NoopRaceEvents, race.race_id)
        .await
        .unwrap();

    let entry = adjustments::add_penalty(
        db.pool(),
        race.race_id,
        runner.participant_id,
        30,
        "cut the course",
        Some("referee-1"),
    )
    .await
    .unwrap();

    let history = audit::entity_history(db.pool(), "ResultCache", entry.result_id)
        .await
        .unwrap();
    let penalty = &history[0];

    assert_eq!(penalty.user_id.as_deref(), Some("referee-1"));
    assert_eq!(
        penalty.reason.as_deref(),
        Some("PENALTY 30s: cut the course")
    );

    let before: serde_json::Value =
        serde_json::from_str(penalty.before_state.as_deref().unwrap()).unwrap();
    let after: serde_json::Value =
        serde_json::from_str(penalty.after_state.as_deref().unwrap()).unwrap();
    assert_eq!(before["chipTimeMs"], 3_699_000);
    assert_eq!(after["chipTimeMs"], 3_729_000);
}

#[tokio::test]
async fn race_history_honours_the_limit() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, _) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    for i in 0..5 {
        timing::record_event(
            db.pool(),
            &NoopRaceEvents,
            race.race_id,
            &event_request(runner.participant_id, start.checkpoint_id, 1_000 + i),
        )
        .await
        .unwrap();
    }

    let limited = audit::race_history(db.pool(), race.race_id, 3).await.unwrap();
    assert_eq!(limited.len(), 3);

    let all = audit::race_history(db.pool(), race.race_id, 100).await.unwrap();
    assert_eq!(all.len(), 5);
}
