use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use super::handlers::{
    delete_event, list_events, recalculate_times, record_bulk_events, record_event,
    undo_delete_event, update_event,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/races/:race_id/events", post(record_event))
        .route("/races/:race_id/events/bulk", post(record_bulk_events))
        .route("/events/:event_id", put(update_event))
        .route("/events/:event_id", delete(delete_event))
        .route("/events/:event_id/undo", post(undo_delete_event))
        .route(
            "/races/:race_id/participants/:participant_id/recalculate",
            post(recalculate_times),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/races/:race_id/events", get(list_events))
        .merge(protected)
}
