use std::sync::Arc;

use storage::Database;
use storage::services::events::RaceEvents;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub events: Arc<dyn RaceEvents>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            events: Arc::new(LogRaceEvents),
        }
    }
}

/// Emits race lifecycle notifications to the log. Stands where a push
/// channel (websocket broadcast, message bus) would plug in.
pub struct LogRaceEvents;

impl RaceEvents for LogRaceEvents {
    fn on_timing_event_recorded(&self, race_id: Uuid, event_id: Uuid, sequence: i64) {
        tracing::info!(%race_id, %event_id, sequence, "timing event recorded");
    }

    fn on_results_recomputed(&self, race_id: Uuid, count: u64) {
        tracing::info!(%race_id, count, "results recomputed");
    }
}
