mod common;

use common::*;
use storage::dto::session::{StartSessionRequest, UpdateSessionRequest};
use storage::error::StorageError;
use storage::services::events::NoopRaceEvents;
use storage::services::{sessions, timing};
use uuid::Uuid;

#[tokio::test]
async fn session_lifecycle() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let session = sessions::start_session(
        db.pool(),
        race.race_id,
        &StartSessionRequest {
            device_id: Some("finish-mat-1".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(session.device_id.as_deref(), Some("finish-mat-1"));
    assert!(session.ended_at.is_none());

    let updated = sessions::update_session(
        db.pool(),
        session.session_id,
        &UpdateSessionRequest {
            device_id: None,
            metadata: Some(r#"{"firmware":"2.4"}"#.to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.device_id.as_deref(), Some("finish-mat-1"));
    assert_eq!(updated.metadata.as_deref(), Some(r#"{"firmware":"2.4"}"#));

    let ended = sessions::end_session(db.pool(), session.session_id).await.unwrap();
    assert!(ended.ended_at.is_some());

    let err = sessions::end_session(db.pool(), session.session_id).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidState(_)));
}

#[tokio::test]
async fn rejects_invalid_metadata_json() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let session = sessions::start_session(db.pool(), race.race_id, &StartSessionRequest::default())
        .await
        .unwrap();

    let err = sessions::update_session(
        db.pool(),
        session.session_id,
        &UpdateSessionRequest {
            device_id: None,
            metadata: Some("{not json".to_string()),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, StorageError::Validation(_)));
}

#[tokio::test]
async fn start_session_requires_a_race() {
    let db = setup().await;

    let err = sessions::start_session(db.pool(), Uuid::new_v4(), &StartSessionRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound("race")));
}

#[tokio::test]
async fn events_remember_their_session() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;
    let (start, _) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;

    let session = sessions::start_session(db.pool(), race.race_id, &StartSessionRequest::default())
        .await
        .unwrap();

    let mut req = event_request(runner.participant_id, start.checkpoint_id, 1_000);
    req.timing_session_id = Some(session.session_id);

    let event = timing::record_event(db.pool(), &NoopRaceEvents, race.race_id, &req)
        .await
        .unwrap();

    assert_eq!(event.timing_session_id, Some(session.session_id));
}
