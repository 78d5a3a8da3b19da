use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use storage::{
    dto::adjustment::{AddPenaltyRequest, AdjustTimeRequest, DisqualifyRequest, ReinstateRequest},
    models::ResultCacheEntry,
    services::adjustments,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

/// Operator identity for the audit trail, when the client sends one.
fn user_id(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-user-id").and_then(|v| v.to_str().ok())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/participants/{participant_id}/adjust-time",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    request_body = AdjustTimeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Adjusted result entry", body = ResultCacheEntry),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Result not found"),
        (status = 409, description = "Result was modified concurrently")
    ),
    tag = "adjustments"
)]
pub async fn adjust_time(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(req): Json<AdjustTimeRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = adjustments::adjust_time(
        state.db.pool(),
        race_id,
        participant_id,
        req.adjustment_ms,
        &req.reason,
        user_id(&headers),
    )
    .await?;

    Ok(Json(entry).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/participants/{participant_id}/penalty",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    request_body = AddPenaltyRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Penalized result entry", body = ResultCacheEntry),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Result not found"),
        (status = 409, description = "Result was modified concurrently")
    ),
    tag = "adjustments"
)]
pub async fn add_penalty(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(req): Json<AddPenaltyRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = adjustments::add_penalty(
        state.db.pool(),
        race_id,
        participant_id,
        req.penalty_seconds,
        &req.reason,
        user_id(&headers),
    )
    .await?;

    Ok(Json(entry).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/participants/{participant_id}/disqualify",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    request_body = DisqualifyRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Disqualified result entry", body = ResultCacheEntry),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Result not found"),
        (status = 409, description = "Result was modified concurrently")
    ),
    tag = "adjustments"
)]
pub async fn disqualify(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(req): Json<DisqualifyRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = adjustments::disqualify(
        state.db.pool(),
        race_id,
        participant_id,
        &req.reason,
        user_id(&headers),
    )
    .await?;

    Ok(Json(entry).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/participants/{participant_id}/reinstate",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    request_body = ReinstateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reinstated result entry", body = ResultCacheEntry),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Result not found"),
        (status = 409, description = "Participant is not disqualified")
    ),
    tag = "adjustments"
)]
pub async fn reinstate(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(req): Json<ReinstateRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = adjustments::reinstate(
        state.db.pool(),
        race_id,
        participant_id,
        req.category.as_deref(),
        user_id(&headers),
    )
    .await?;

    Ok(Json(entry).into_response())
}
