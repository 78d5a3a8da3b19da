use axum::{
    Router, middleware,
    routing::{post, put},
};

use super::handlers::{end_session, start_session, update_session};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/races/:race_id/sessions", post(start_session))
        .route("/sessions/:session_id", put(update_session))
        .route("/sessions/:session_id/end", post(end_session))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
