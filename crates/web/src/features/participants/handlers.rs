use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use storage::{
    dto::participant::{CreateParticipantRequest, CreateRegistrationRequest, UpdateParticipantRequest},
    error::StorageError,
    models::{Participant, Registration},
    repository::participant::ParticipantRepository,
    repository::race::RaceRepository,
    repository::registration::RegistrationRepository,
    services::roster,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/participants",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "Participants in creation order", body = Vec<Participant>),
        (status = 404, description = "Race not found")
    ),
    tag = "participants"
)]
pub async fn list_participants(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    if !RaceRepository::new(state.db.pool()).exists(race_id).await? {
        return Err(StorageError::NotFound("race").into());
    }

    let participants = ParticipantRepository::new(state.db.pool())
        .list_for_race(race_id)
        .await?;

    Ok(Json(participants).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/participants",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    request_body = CreateParticipantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Participant created", body = Participant),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "participants"
)]
pub async fn create_participant(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Json(req): Json<CreateParticipantRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    if !RaceRepository::new(state.db.pool()).exists(race_id).await? {
        return Err(StorageError::NotFound("race").into());
    }

    let participant = ParticipantRepository::new(state.db.pool())
        .create(race_id, &req)
        .await?;

    Ok((StatusCode::CREATED, Json(participant)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/races/{race_id}/participants/{participant_id}",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    request_body = UpdateParticipantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Participant updated", body = Participant),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn update_participant(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateParticipantRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let repo = ParticipantRepository::new(state.db.pool());
    if !repo.belongs_to_race(participant_id, race_id).await? {
        return Err(StorageError::NotFound("participant").into());
    }

    let participant = repo.update(participant_id, &req).await?;

    Ok(Json(participant).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/participants/{participant_id}/registrations",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    request_body = CreateRegistrationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Registration created", body = Registration),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn create_registration(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CreateRegistrationRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    if !ParticipantRepository::new(state.db.pool())
        .belongs_to_race(participant_id, race_id)
        .await?
    {
        return Err(StorageError::NotFound("participant").into());
    }

    let registration = RegistrationRepository::new(state.db.pool())
        .create(participant_id, &req)
        .await?;

    Ok((StatusCode::CREATED, Json(registration)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/roster/import",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    request_body(content = String, content_type = "text/csv"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Number of imported participants"),
        (status = 400, description = "Malformed CSV"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "participants"
)]
pub async fn import_roster(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    body: String,
) -> Result<Response, WebError> {
    let imported = roster::import_participants(state.db.pool(), race_id, &body).await?;

    Ok(Json(serde_json::json!({ "imported": imported })).into_response())
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/roster/export",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "Roster as CSV", content_type = "text/csv"),
        (status = 404, description = "Race not found")
    ),
    tag = "participants"
)]
pub async fn export_roster(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let csv = roster::export_participants(state.db.pool(), race_id).await?;

    Ok(([(header::CONTENT_TYPE, "text/csv")], csv).into_response())
}
