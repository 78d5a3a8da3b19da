mod common;

use std::collections::HashSet;

use common::*;
use storage::Database;
use storage::repository::timing_event::TimingEventRepository;
use storage::services::events::NoopRaceEvents;
use storage::services::timing;

/// Two writers racing on the same file-backed database must never receive
/// the same sequence number.
#[tokio::test]
async fn concurrent_writers_get_unique_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("race.db").display());

    let db = Database::new(&url).await.unwrap();
    db.run_migrations().await.unwrap();

    let race = create_race(&db, "City 10K").await;
    let (start, _) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    let per_writer = 10i64;
    let mut handles = Vec::new();
    for writer in 0..2i64 {
        let db = db.clone();
        let race_id = race.race_id;
        let participant_id = runner.participant_id;
        let checkpoint_id = start.checkpoint_id;
        handles.push(tokio::spawn(async move {
            for i in 0..per_writer {
                timing::record_event(
                    db.pool(),
                    &NoopRaceEvents,
                    race_id,
                    &event_request(participant_id, checkpoint_id, writer * 100_000 + i),
                )
                .await
                .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let events = TimingEventRepository::new(db.pool())
        .list_for_race(race.race_id)
        .await
        .unwrap();
    assert_eq!(events.len(), 20);

    let sequences: HashSet<i64> = events.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences.len(), 20);
    assert_eq!(events.iter().map(|e| e.sequence).max(), Some(20));
    assert_eq!(events.iter().map(|e| e.sequence).min(), Some(1));
}
