use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{export_results, get_leaderboard, refresh_results};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/races/:race_id/results/refresh", post(refresh_results))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/races/:race_id/results", get(get_leaderboard))
        .route("/races/:race_id/results/export", get(export_results))
        .merge(protected)
}
