use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordTimingEventRequest {
    pub participant_id: Uuid,
    pub checkpoint_id: Uuid,
    pub registration_id: Option<Uuid>,
    pub timing_session_id: Option<Uuid>,
    pub time_ms: i64,
    pub device_ts: Option<DateTime<Utc>>,
    #[validate(length(max = 100))]
    pub source: Option<String>,
    #[validate(length(max = 50))]
    pub qualifier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkTimingEventItem {
    pub participant_id: Uuid,
    pub checkpoint_id: Uuid,
    pub registration_id: Option<Uuid>,
    pub time_ms: i64,
    pub device_ts: Option<DateTime<Utc>>,
    #[validate(length(max = 100))]
    pub source: Option<String>,
    #[validate(length(max = 50))]
    pub qualifier: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordBulkTimingEventsRequest {
    pub timing_session_id: Option<Uuid>,
    #[validate(length(min = 1), nested)]
    pub events: Vec<BulkTimingEventItem>,
}

/// Partial update for a timing event. A present `time_ms` triggers an
/// elapsed-time recompute before the row is persisted.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTimingEventRequest {
    pub time_ms: Option<i64>,
    pub device_ts: Option<DateTime<Utc>>,
    #[validate(length(max = 100))]
    pub source: Option<String>,
    #[validate(length(max = 50))]
    pub qualifier: Option<String>,
}
