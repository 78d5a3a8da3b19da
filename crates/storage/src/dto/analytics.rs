use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Field-wide summary of one race. Aggregate times are in seconds and
/// cover finishers only (disqualified entries are excluded).
#[derive(Debug, Serialize, ToSchema)]
pub struct RaceStatistics {
    pub total_participants: i64,
    pub total_finishers: i64,
    pub total_dnf: i64,
    pub total_dq: i64,
    pub average_time_seconds: Option<f64>,
    pub fastest_time_seconds: Option<f64>,
    pub slowest_time_seconds: Option<f64>,
}

/// Traffic through one checkpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckpointStatistics {
    pub checkpoint_id: Uuid,
    pub checkpoint_name: String,
    pub total_events: i64,
    pub average_elapsed_seconds: Option<f64>,
    pub throughput_per_hour: Option<f64>,
}

/// One split in a participant's passage through the course, in
/// checkpoint order.
#[derive(Debug, Serialize, ToSchema)]
pub struct SplitTime {
    pub checkpoint_id: Option<Uuid>,
    pub checkpoint_name: Option<String>,
    pub order_index: Option<i32>,
    pub time_ms: i64,
    pub elapsed_ms: Option<i64>,
}
