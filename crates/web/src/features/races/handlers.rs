use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::checkpoint::CreateCheckpointRequest,
    dto::race::{CreateRaceRequest, RaceDetailResponse},
    models::{Checkpoint, Race},
    repository::checkpoint::CheckpointRepository,
    repository::race::RaceRepository,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/races",
    responses(
        (status = 200, description = "List all races", body = Vec<Race>)
    ),
    tag = "races"
)]
pub async fn list_races(State(state): State<AppState>) -> Result<Response, WebError> {
    let races = RaceRepository::new(state.db.pool()).list().await?;

    Ok(Json(races).into_response())
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "Race with checkpoints and participant count", body = RaceDetailResponse),
        (status = 404, description = "Race not found")
    ),
    tag = "races"
)]
pub async fn get_race(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let races = RaceRepository::new(state.db.pool());
    let race = races.find_by_id(race_id).await?;
    let checkpoints = CheckpointRepository::new(state.db.pool())
        .list_for_race(race_id)
        .await?;
    let participant_count = races.participant_count(race_id).await?;

    Ok(Json(RaceDetailResponse::new(race, checkpoints, participant_count)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races",
    request_body = CreateRaceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Race created", body = Race),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "races"
)]
pub async fn create_race(
    State(state): State<AppState>,
    Json(req): Json<CreateRaceRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let race = RaceRepository::new(state.db.pool()).create(&req).await?;

    Ok((StatusCode::CREATED, Json(race)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/checkpoints",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "Checkpoints in course order", body = Vec<Checkpoint>),
        (status = 404, description = "Race not found")
    ),
    tag = "races"
)]
pub async fn list_checkpoints(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    if !RaceRepository::new(state.db.pool()).exists(race_id).await? {
        return Err(storage::error::StorageError::NotFound("race").into());
    }

    let checkpoints = CheckpointRepository::new(state.db.pool())
        .list_for_race(race_id)
        .await?;

    Ok(Json(checkpoints).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/checkpoints",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    request_body = CreateCheckpointRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Checkpoint created", body = Checkpoint),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "races"
)]
pub async fn create_checkpoint(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Json(req): Json<CreateCheckpointRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    if !RaceRepository::new(state.db.pool()).exists(race_id).await? {
        return Err(storage::error::StorageError::NotFound("race").into());
    }

    let checkpoint = CheckpointRepository::new(state.db.pool())
        .create(race_id, &req)
        .await?;

    Ok((StatusCode::CREATED, Json(checkpoint)).into_response())
}
