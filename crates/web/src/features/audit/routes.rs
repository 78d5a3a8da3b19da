use axum::{Router, routing::get};

use super::handlers::{entity_history, race_history};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/races/:race_id/audit", get(race_history))
        .route("/audit/:entity_type/:entity_id", get(entity_history))
}
