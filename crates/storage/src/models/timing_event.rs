use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// The atomic timing fact. `time_ms` is the only source of truth for
/// ordering; `elapsed_ms` is derived and recomputable. `sequence` is
/// assigned once at ingestion and never reused or renumbered. Rows are
/// soft-deleted, never physically removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimingEvent {
    pub event_id: Uuid,
    pub race_id: Uuid,
    pub participant_id: Uuid,
    pub checkpoint_id: Option<Uuid>,
    pub registration_id: Option<Uuid>,
    pub timing_session_id: Option<Uuid>,
    pub time_ms: i64,
    pub elapsed_ms: Option<i64>,
    pub sequence: i64,
    pub device_ts: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub qualifier: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}
