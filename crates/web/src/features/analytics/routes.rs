use axum::{Router, routing::get};

use super::handlers::{checkpoint_statistics, participant_splits, race_statistics};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/races/:race_id/statistics", get(race_statistics))
        .route(
            "/races/:race_id/checkpoints/statistics",
            get(checkpoint_statistics),
        )
        .route(
            "/races/:race_id/participants/:participant_id/splits",
            get(participant_splits),
        )
}
