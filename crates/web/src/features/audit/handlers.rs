use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storage::{dto::audit::AuditEntryResponse, services::audit};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/audit",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("limit" = Option<i64>, Query, description = "Maximum entries, newest first")
    ),
    responses(
        (status = 200, description = "Audit trail for the race, newest first", body = Vec<AuditEntryResponse>)
    ),
    tag = "audit"
)]
pub async fn race_history(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, WebError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let entries = audit::race_history(state.db.pool(), race_id, limit).await?;

    let response: Vec<AuditEntryResponse> =
        entries.into_iter().map(AuditEntryResponse::from).collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/audit/{entity_type}/{entity_id}",
    params(
        ("entity_type" = String, Path, description = "Audited entity type"),
        ("entity_id" = Uuid, Path, description = "Entity id")
    ),
    responses(
        (status = 200, description = "Audit history of one entity, newest first", body = Vec<AuditEntryResponse>)
    ),
    tag = "audit"
)]
pub async fn entity_history(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, Uuid)>,
) -> Result<Response, WebError> {
    let entries = audit::entity_history(state.db.pool(), &entity_type, entity_id).await?;

    let response: Vec<AuditEntryResponse> =
        entries.into_iter().map(AuditEntryResponse::from).collect();

    Ok(Json(response).into_response())
}
