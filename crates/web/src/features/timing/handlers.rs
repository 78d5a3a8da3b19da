use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::timing::{
        RecordBulkTimingEventsRequest, RecordTimingEventRequest, UpdateTimingEventRequest,
    },
    error::StorageError,
    models::TimingEvent,
    repository::race::RaceRepository,
    repository::timing_event::TimingEventRepository,
    services::timing,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/events",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "All timing events in sequence order", body = Vec<TimingEvent>),
        (status = 404, description = "Race not found")
    ),
    tag = "timing"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    if !RaceRepository::new(state.db.pool()).exists(race_id).await? {
        return Err(StorageError::NotFound("race").into());
    }

    let events = TimingEventRepository::new(state.db.pool())
        .list_for_race(race_id)
        .await?;

    Ok(Json(events).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/events",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    request_body = RecordTimingEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Timing event recorded", body = TimingEvent),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "timing"
)]
pub async fn record_event(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Json(req): Json<RecordTimingEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let event = timing::record_event(state.db.pool(), state.events.as_ref(), race_id, &req).await?;

    Ok((StatusCode::CREATED, Json(event)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/events/bulk",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    request_body = RecordBulkTimingEventsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "All events recorded with contiguous sequences", body = Vec<TimingEvent>),
        (status = 400, description = "Validation error, nothing recorded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "timing"
)]
pub async fn record_bulk_events(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Json(req): Json<RecordBulkTimingEventsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let events = timing::record_bulk(state.db.pool(), state.events.as_ref(), race_id, &req).await?;

    Ok((StatusCode::CREATED, Json(events)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Timing event id")
    ),
    request_body = UpdateTimingEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Timing event updated", body = TimingEvent),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Timing event not found")
    ),
    tag = "timing"
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateTimingEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let event = timing::update_event(state.db.pool(), event_id, &req).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Timing event id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Timing event soft-deleted", body = TimingEvent),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Timing event not found"),
        (status = 409, description = "Already deleted")
    ),
    tag = "timing"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let event = timing::soft_delete_event(state.db.pool(), event_id).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/undo",
    params(
        ("event_id" = Uuid, Path, description = "Timing event id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Soft delete undone", body = TimingEvent),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Timing event not found"),
        (status = 409, description = "Event is not deleted")
    ),
    tag = "timing"
)]
pub async fn undo_delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let event = timing::undo_delete_event(state.db.pool(), event_id).await?;

    Ok(Json(event).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/participants/{participant_id}/recalculate",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Number of events with recalculated elapsed times"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "timing"
)]
pub async fn recalculate_times(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    let recalculated = timing::recalculate_times(state.db.pool(), race_id, participant_id).await?;

    Ok(Json(serde_json::json!({ "recalculated": recalculated })).into_response())
}
