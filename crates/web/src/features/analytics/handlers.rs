use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::analytics::{CheckpointStatistics, RaceStatistics, SplitTime},
    services::analytics,
};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/statistics",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "Finisher/DNF/DQ counts and aggregate times", body = RaceStatistics),
        (status = 404, description = "Race not found")
    ),
    tag = "analytics"
)]
pub async fn race_statistics(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let stats = analytics::race_statistics(state.db.pool(), race_id).await?;

    Ok(Json(stats).into_response())
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/checkpoints/statistics",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "Per-checkpoint traffic in course order", body = Vec<CheckpointStatistics>),
        (status = 404, description = "Race not found")
    ),
    tag = "analytics"
)]
pub async fn checkpoint_statistics(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let stats = analytics::checkpoint_statistics(state.db.pool(), race_id).await?;

    Ok(Json(stats).into_response())
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/participants/{participant_id}/splits",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    responses(
        (status = 200, description = "Split times in course order", body = Vec<SplitTime>),
        (status = 404, description = "Race or participant not found")
    ),
    tag = "analytics"
)]
pub async fn participant_splits(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    let splits = analytics::participant_splits(state.db.pool(), race_id, participant_id).await?;

    Ok(Json(splits).into_response())
}
