use uuid::Uuid;

/// Notification seam called after successful mutations. Implementations own
/// any fan-out (logging, websockets, webhooks); the core holds no
/// subscriber state.
pub trait RaceEvents: Send + Sync {
    fn on_timing_event_recorded(&self, _race_id: Uuid, _event_id: Uuid, _sequence: i64) {}

    fn on_results_recomputed(&self, _race_id: Uuid, _count: u64) {}
}

pub struct NoopRaceEvents;

impl RaceEvents for NoopRaceEvents {}
