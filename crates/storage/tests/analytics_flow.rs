mod common;

use common::*;
use storage::error::StorageError;
use storage::services::events::NoopRaceEvents;
use storage::services::{adjustments, analytics, results, timing};
use uuid::Uuid;

#[tokio::test]
async fn race_statistics_count_the_field() {
    let db = setup().await;
    let race = create_race(&db, "City Marathon").await;
    let (start, finish) = create_course(&db, race.race_id).await;

    let finisher = create_participant(&db, race.race_id, "Ada", "Lovelace").await;
    let _dnf = create_participant(&db, race.race_id, "Grace", "Hopper").await;
    let cheat = create_participant(&db, race.race_id, "Charles", "Babbage").await;

    for (participant, start_ms, finish_ms) in [
        (&finisher, 1_000, 61_000),
        (&cheat, 1_000, 121_000),
    ] {
        timing::record_event(
            db.pool(),
            &NoopRaceEvents,
            race.race_id,
            &event_request(participant.participant_id, start.checkpoint_id, start_ms),
        )
        .await
        .unwrap();
        timing::record_event(
            db.pool(),
            &NoopRaceEvents,
            race.race_id,
            &event_request(participant.participant_id, finish.checkpoint_id, finish_ms),
        )
        .await
        .unwrap();
    }
    results::refresh_results(db.pool(), &NoopRaceEvents, race.race_id)
        .await
        .unwrap();
    adjustments::disqualify(
        db.pool(),
        race.race_id,
        cheat.participant_id,
        "rode a bicycle",
        None,
    )
    .await
    .unwrap();

    let stats = analytics::race_statistics(db.pool(), race.race_id).await.unwrap();

    assert_eq!(stats.total_participants, 3);
    assert_eq!(stats.total_finishers, 1);
    assert_eq!(stats.total_dnf, 1);
    assert_eq!(stats.total_dq, 1);
    // The disqualified chip time stays out of the aggregates.
    assert_eq!(stats.average_time_seconds, Some(60.0));
    assert_eq!(stats.fastest_time_seconds, Some(60.0));
    assert_eq!(stats.slowest_time_seconds, Some(60.0));
}

#[tokio::test]
async fn empty_race_statistics_have_no_times() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let stats = analytics::race_statistics(db.pool(), race.race_id).await.unwrap();

    assert_eq!(stats.total_participants, 0);
    assert_eq!(stats.total_finishers, 0);
    assert_eq!(stats.average_time_seconds, None);
    assert_eq!(stats.fastest_time_seconds, None);
}

#[tokio::test]
async fn checkpoint_statistics_follow_course_order() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, finish) = create_course(&db, race.race_id).await;
    let ada = create_participant(&db, race.race_id, "Ada", "Lovelace").await;
    let grace = create_participant(&db, race.race_id, "Grace", "Hopper").await;

    // Two starts half an hour apart, one finish.
    timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(ada.participant_id, start.checkpoint_id, 0),
    )
    .await
    .unwrap();
    timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(grace.participant_id, start.checkpoint_id, 1_800_000),
    )
    .await
    .unwrap();
    timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(ada.participant_id, finish.checkpoint_id, 600_000),
    )
    .await
    .unwrap();

    let stats = analytics::checkpoint_statistics(db.pool(), race.race_id).await.unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].checkpoint_id, start.checkpoint_id);
    assert_eq!(stats[0].total_events, 2);
    assert_eq!(stats[0].average_elapsed_seconds, Some(0.0));
    // Two events across half an hour.
    assert_eq!(stats[0].throughput_per_hour, Some(4.0));

    assert_eq!(stats[1].checkpoint_id, finish.checkpoint_id);
    assert_eq!(stats[1].total_events, 1);
    assert_eq!(stats[1].average_elapsed_seconds, Some(600.0));
    assert_eq!(stats[1].throughput_per_hour, None);
}

#[tokio::test]
async fn splits_follow_course_order_not_submission_order() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, finish) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    // Finish reading arrives before the start reading.
    timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(runner.participant_id, finish.checkpoint_id, 9_000),
    )
    .await
    .unwrap();
    timing::record_event(
        db.pool(),
        &NoopRaceEvents,
        race.race_id,
        &event_request(runner.participant_id, start.checkpoint_id, 1_000),
    )
    .await
    .unwrap();
    timing::recalculate_times(db.pool(), race.race_id, runner.participant_id)
        .await
        .unwrap();

    let splits = analytics::participant_splits(db.pool(), race.race_id, runner.participant_id)
        .await
        .unwrap();

    assert_eq!(splits.len(), 2);
    assert_eq!(splits[0].checkpoint_id, Some(start.checkpoint_id));
    assert_eq!(splits[0].elapsed_ms, Some(0));
    assert_eq!(splits[1].checkpoint_id, Some(finish.checkpoint_id));
    assert_eq!(splits[1].elapsed_ms, Some(8_000));
}

#[tokio::test]
async fn splits_require_a_known_participant() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let err = analytics::participant_splits(db.pool(), race.race_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound("participant")));

    let err = analytics::race_statistics(db.pool(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound("race")));
}
