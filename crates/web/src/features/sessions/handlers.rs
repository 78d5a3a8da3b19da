use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::session::{StartSessionRequest, UpdateSessionRequest},
    models::TimingSession,
    services::sessions,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/sessions",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    request_body = StartSessionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Timing session started", body = TimingSession),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "sessions"
)]
pub async fn start_session(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let session = sessions::start_session(state.db.pool(), race_id, &req).await?;

    Ok((StatusCode::CREATED, Json(session)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Timing session id")
    ),
    request_body = UpdateSessionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Timing session updated", body = TimingSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Timing session not found")
    ),
    tag = "sessions"
)]
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let session = sessions::update_session(state.db.pool(), session_id, &req).await?;

    Ok(Json(session).into_response())
}

#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/end",
    params(
        ("session_id" = Uuid, Path, description = "Timing session id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Timing session ended", body = TimingSession),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Timing session not found"),
        (status = 409, description = "Already ended")
    ),
    tag = "sessions"
)]
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let session = sessions::end_session(state.db.pool(), session_id).await?;

    Ok(Json(session).into_response())
}
