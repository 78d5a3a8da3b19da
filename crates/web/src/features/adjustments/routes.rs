use axum::{Router, middleware, routing::post};

use super::handlers::{add_penalty, adjust_time, disqualify, reinstate};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route(
            "/races/:race_id/participants/:participant_id/adjust-time",
            post(adjust_time),
        )
        .route(
            "/races/:race_id/participants/:participant_id/penalty",
            post(add_penalty),
        )
        .route(
            "/races/:race_id/participants/:participant_id/disqualify",
            post(disqualify),
        )
        .route(
            "/races/:race_id/participants/:participant_id/reinstate",
            post(reinstate),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
