use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storage::{
    dto::results::LeaderboardEntry,
    services::{results, roster},
};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub category: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/results/refresh",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Number of cached result rows after the recompute"),
        (status = 400, description = "Race has no start or finish checkpoint"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "results"
)]
pub async fn refresh_results(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let refreshed =
        results::refresh_results(state.db.pool(), state.events.as_ref(), race_id).await?;

    Ok(Json(serde_json::json!({ "refreshed": refreshed })).into_response())
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/results",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("category" = Option<String>, Query, description = "Restrict to one category")
    ),
    responses(
        (status = 200, description = "Ranked leaderboard", body = Vec<LeaderboardEntry>),
        (status = 404, description = "Race not found")
    ),
    tag = "results"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Response, WebError> {
    let entries =
        results::leaderboard(state.db.pool(), race_id, query.category.as_deref()).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/races/{race_id}/results/export",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    responses(
        (status = 200, description = "Results as CSV", content_type = "text/csv"),
        (status = 404, description = "Race not found")
    ),
    tag = "results"
)]
pub async fn export_results(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let csv = roster::export_results(state.db.pool(), race_id).await?;

    Ok(([(header::CONTENT_TYPE, "text/csv")], csv).into_response())
}
