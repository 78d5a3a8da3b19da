use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{create_checkpoint, create_race, get_race, list_checkpoints, list_races};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/races", post(create_race))
        .route("/races/:race_id/checkpoints", post(create_checkpoint))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/races", get(list_races))
        .route("/races/:race_id", get(get_race))
        .route("/races/:race_id/checkpoints", get(list_checkpoints))
        .merge(protected)
}
