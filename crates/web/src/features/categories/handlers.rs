use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::adjustment::SetCategoryRequest, models::ResultCacheEntry, services::categories,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/categories/assign",
    params(
        ("race_id" = Uuid, Path, description = "Race id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Number of results that received a category"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "categories"
)]
pub async fn assign_categories(
    State(state): State<AppState>,
    Path(race_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let categorized = categories::assign_categories(state.db.pool(), race_id).await?;

    Ok(Json(serde_json::json!({ "categorized": categorized })).into_response())
}

#[utoipa::path(
    put,
    path = "/api/races/{race_id}/participants/{participant_id}/category",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("participant_id" = Uuid, Path, description = "Participant id")
    ),
    request_body = SetCategoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Result entry with the new category", body = ResultCacheEntry),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "categories"
)]
pub async fn set_category(
    State(state): State<AppState>,
    Path((race_id, participant_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SetCategoryRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry =
        categories::set_category(state.db.pool(), race_id, participant_id, &req.category).await?;

    Ok(Json(entry).into_response())
}

#[utoipa::path(
    post,
    path = "/api/races/{race_id}/categories/{category}/recalculate",
    params(
        ("race_id" = Uuid, Path, description = "Race id"),
        ("category" = String, Path, description = "Category name")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Number of re-ranked results in the category"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "categories"
)]
pub async fn recalculate_category_places(
    State(state): State<AppState>,
    Path((race_id, category)): Path<(Uuid, String)>,
) -> Result<Response, WebError> {
    let ranked =
        categories::recalculate_category_places(state.db.pool(), race_id, &category).await?;

    Ok(Json(serde_json::json!({ "ranked": ranked })).into_response())
}
