use axum::{
    Router, middleware,
    routing::{post, put},
};

use super::handlers::{assign_categories, recalculate_category_places, set_category};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/races/:race_id/categories/assign", post(assign_categories))
        .route(
            "/races/:race_id/participants/:participant_id/category",
            put(set_category),
        )
        .route(
            "/races/:race_id/categories/:category/recalculate",
            post(recalculate_category_places),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
