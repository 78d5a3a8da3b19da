use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    create_participant, create_registration, export_roster, import_roster, list_participants,
    update_participant,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/races/:race_id/participants", post(create_participant))
        .route(
            "/races/:race_id/participants/:participant_id",
            put(update_participant),
        )
        .route(
            "/races/:race_id/participants/:participant_id/registrations",
            post(create_registration),
        )
        .route("/races/:race_id/roster/import", post(import_roster))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/races/:race_id/participants", get(list_participants))
        .route("/races/:race_id/roster/export", get(export_roster))
        .merge(protected)
}
