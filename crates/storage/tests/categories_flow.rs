mod common;

use common::*;
use storage::repository::result_cache::ResultCacheRepository;
use storage::services::events::NoopRaceEvents;
use storage::services::{adjustments, categories, results, timing};

#[tokio::test]
async fn assigns_age_gender_categories() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, finish) = create_course(&db, race.race_id).await;

    let veteran =
        create_participant_with(&db, race.race_id, "Ada", "Lovelace", Some("F"), Some(1970)).await;
    let unknown = create_participant(&db, race.race_id, "Grace", "Hopper").await;

    for participant in [&veteran, &unknown] {
        timing::record_event(
            db.pool(),
            &NoopRaceEvents,
            race.race_id,
            &event_request(participant.participant_id, start.checkpoint_id, 1_000),
        )
        .await
        .unwrap();
        timing::record_event(
            db.pool(),
            &NoopRaceEvents,
            race.race_id,
            &event_request(participant.participant_id, finish.checkpoint_id, 300_000),
        )
        .await
        .unwrap();
    }

    results::refresh_results(db.pool(), &NoopRaceEvents, race.race_id)
        .await
        .unwrap();
    let categorized = categories::assign_categories(db.pool(), race.race_id).await.unwrap();
    assert_eq!(categorized, 2);

    let cache = ResultCacheRepository::new(db.pool());
    let veteran_entry = cache
        .find_entry(race.race_id, veteran.participant_id)
        .await
        .unwrap()
        .unwrap();
    assert!(veteran_entry.category.as_deref().unwrap().starts_with("F "));

    let unknown_entry = cache
        .find_entry(race.race_id, unknown.participant_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unknown_entry.category.as_deref(), Some("Open"));
}

#[tokio::test]
async fn assignment_skips_disqualified_entries() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, finish) = create_course(&db, race.race_id).await;
    let runner =
        create_participant_with(&db, race.race_id, "Ada", "Lovelace", Some("F"), Some(1990)).await;

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
        &event_request(runner.participant_id, finish.checkpoint_id, 300_000),
    )
    .await
    .unwrap();

    results::refresh_results(db.pool(), &NoopRaceEvents, race.race_id)
        .await
        .unwrap();
    adjustments::disqualify(db.pool(), race.race_id, runner.participant_id, "x", None)
        .await
        .unwrap();

    let categorized = categories::assign_categories(db.pool(), race.race_id).await.unwrap();
    assert_eq!(categorized, 0);

    let entry = ResultCacheRepository::new(db.pool())
        .find_entry(race.race_id, runner.participant_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.category.as_deref(), Some("DQ"));
}

#[tokio::test]
async fn manual_category_creates_placeholder_when_needed() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    // No results computed yet for this participant.
    let entry = categories::set_category(db.pool(), race.race_id, runner.participant_id, "Elite")
        .await
        .unwrap();

    assert_eq!(entry.category.as_deref(), Some("Elite"));
    assert_eq!(entry.chip_time_ms, None);
    assert_eq!(entry.place, None);
}

#[tokio::test]
async fn category_places_rank_by_chip_time() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, finish) = create_course(&db, race.race_id).await;

    let fast =
        create_participant_with(&db, race.race_id, "Ada", "Lovelace", Some("F"), Some(1990)).await;
    let slow =
        create_participant_with(&db, race.race_id, "Grace", "Hopper", Some("F"), Some(1990)).await;

    for (participant, finish_ms) in [(&slow, 400_000i64), (&fast, 300_000i64)] {
        timing::record_event(
            db.pool(),
            &NoopRaceEvents,
            race.race_id,
            &event_request(participant.participant_id, start.checkpoint_id, 1_000),
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
    categories::assign_categories(db.pool(), race.race_id).await.unwrap();

    let category = ResultCacheRepository::new(db.pool())
        .find_entry(race.race_id, fast.participant_id)
        .await
        .unwrap()
        .unwrap()
        .category
        .unwrap();

    let ranked = categories::recalculate_category_places(db.pool(), race.race_id, &category)
        .await
        .unwrap();
    assert_eq!(ranked, 2);

    let cache = ResultCacheRepository::new(db.pool());
    let fast_entry = cache
        .find_entry(race.race_id, fast.participant_id)
        .await
        .unwrap()
        .unwrap();
    let slow_entry = cache
        .find_entry(race.race_id, slow.participant_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fast_entry.place, Some(1));
    assert_eq!(slow_entry.place, Some(2));
}
