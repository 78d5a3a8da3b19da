#![allow(dead_code)]

use storage::Database;
use storage::dto::checkpoint::CreateCheckpointRequest;
use storage::dto::participant::CreateParticipantRequest;
use storage::dto::race::CreateRaceRequest;
use storage::dto::timing::RecordTimingEventRequest;
use storage::models::{Checkpoint, Participant, Race};
use storage::repository::checkpoint::CheckpointRepository;
use storage::repository::participant::ParticipantRepository;
use storage::repository::race::RaceRepository;
use uuid::Uuid;

pub async fn setup() -> Database {
    let db = Database::in_memory().await.unwrap();
    db.run_migrations().await.unwrap();
    db
}

pub async fn create_race(db: &Database, name: &str) -> Race {
    RaceRepository::new(db.pool())
        .create(&CreateRaceRequest {
            name: name.to_string(),
            start_at: None,
        })
        .await
        .unwrap()
}

pub async fn create_checkpoint(
    db: &Database,
    race_id: Uuid,
    name: &str,
    order_index: i32,
    is_start: bool,
    is_finish: bool,
) -> Checkpoint {
    CheckpointRepository::new(db.pool())
        .create(
            race_id,
            &CreateCheckpointRequest {
                name: name.to_string(),
                order_index,
                is_start,
                is_finish,
            },
        )
        .await
        .unwrap()
}

/// Standard two-checkpoint course: start at index 0, finish at index 1.
pub async fn create_course(db: &Database, race_id: Uuid) -> (Checkpoint, Checkpoint) {
    let start = create_checkpoint(db, race_id, "Start", 0, true, false).await;
    let finish = create_checkpoint(db, race_id, "Finish", 1, false, true).await;
    (start, finish)
}

pub async fn create_participant(db: &Database, race_id: Uuid, first: &str, last: &str) -> Participant {
    create_participant_with(db, race_id, first, last, None, None).await
}

pub async fn create_participant_with(
    db: &Database,
    race_id: Uuid,
    first: &str,
    last: &str,
    gender: Option<&str>,
    birth_year: Option<i32>,
) -> Participant {
    ParticipantRepository::new(db.pool())
        .create(
            race_id,
            &CreateParticipantRequest {
                first_name: first.to_string(),
                last_name: last.to_string(),
                gender: gender.map(String::from),
                birth_year,
                country: None,
            },
        )
        .await
        .unwrap()
}

pub fn event_request(
    participant_id: Uuid,
    checkpoint_id: Uuid,
    time_ms: i64,
) -> RecordTimingEventRequest {
    RecordTimingEventRequest {
        participant_id,
        checkpoint_id,
        registration_id: None,
        timing_session_id: None,
        time_ms,
        device_ts: None,
        source: None,
        qualifier: None,
    }
}
