mod common;

use common::*;
use storage::dto::participant::CreateRegistrationRequest;
use storage::repository::participant::ParticipantRepository;
use storage::repository::registration::RegistrationRepository;
use storage::services::events::NoopRaceEvents;
use storage::services::{results, roster, timing};

#[tokio::test]
async fn imports_participants_with_bibs() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let csv = "firstName,lastName,gender,birthYear,country,bib\n\
               Ada,Lovelace,F,1990,GB,101\n\
               Grace,Hopper,F,1906,US,102\n\
               Alan,Turing,M,1912,GB,\n";

    let imported = roster::import_participants(db.pool(), race.race_id, csv).await.unwrap();
    assert_eq!(imported, 3);

    let participants = ParticipantRepository::new(db.pool())
        .list_for_race(race.race_id)
        .await
        .unwrap();
    assert_eq!(participants.len(), 3);
    assert_eq!(participants[0].first_name, "Ada");
    assert_eq!(participants[0].birth_year, Some(1990));

    // Bib-less rows get no registration.
    let registrations = RegistrationRepository::new(db.pool());
    assert!(
        registrations
            .find_for_participant(participants[0].participant_id)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        registrations
            .find_for_participant(participants[2].participant_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn bad_row_aborts_the_whole_import() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let csv = "firstName,lastName,birthYear\n\
               Ada,Lovelace,1990\n\
               Grace,Hopper,not-a-year\n";

    assert!(roster::import_participants(db.pool(), race.race_id, csv).await.is_err());

    let participants = ParticipantRepository::new(db.pool())
        .list_for_race(race.race_id)
        .await
        .unwrap();
    assert!(participants.is_empty());
}

#[tokio::test]
async fn roster_round_trips_through_export() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let csv = "firstName,lastName,gender,birthYear,country,bib\nAda,Lovelace,F,1990,GB,101\n";
    roster::import_participants(db.pool(), race.race_id, csv).await.unwrap();

    let exported = roster::export_participants(db.pool(), race.race_id).await.unwrap();
    assert_eq!(
        exported,
        "firstName,lastName,gender,birthYear,country,bib\nAda,Lovelace,F,1990,GB,101\n"
    );
}

#[tokio::test]
async fn names_with_commas_survive_the_round_trip() {
    let db = setup().await;
    let race = create_race(&db, "City 10K").await;

    let csv = "firstName,lastName,gender,birthYear,country,bib\n\
               Ada,\"Lovelace, Countess\",F,1990,GB,101\n";
    roster::import_participants(db.pool(), race.race_id, csv).await.unwrap();

    let participants = ParticipantRepository::new(db.pool())
        .list_for_race(race.race_id)
        .await
        .unwrap();
    assert_eq!(participants[0].last_name, "Lovelace, Countess");

    let exported = roster::export_participants(db.pool(), race.race_id).await.unwrap();
    assert_eq!(
        exported,
        "firstName,lastName,gender,birthYear,country,bib\nAda,\"Lovelace, Countess\",F,1990,GB,101\n"
    );
}

#[tokio::test]
async fn results_export_uses_stable_columns() {
    let db = setup().await;
    let race = create_race(&db, "City Marathon").await;
    let (start, finish) = create_course(&db, race.race_id).await;
    let runner = create_participant(&db, race.race_id, "Ada", "Lovelace").await;
    RegistrationRepository::new(db.pool())
        .create(
            runner.participant_id,
            &CreateRegistrationRequest {
                bib: "101".to_string(),
                wave: None,
            },
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

    let exported = roster::export_results(db.pool(), race.race_id).await.unwrap();
    let mut lines = exported.lines();

    assert_eq!(
        lines.next(),
        Some("place,bib,firstName,lastName,category,gunTime,chipTime,netTime")
    );
    assert_eq!(lines.next(), Some("1,101,Ada,Lovelace,,3699,3699,3699"));
    assert_eq!(lines.next(), None);
}
