use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Bookkeeping envelope grouping a device/operator batch of timing events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimingSession {
    pub session_id: Uuid,
    pub race_id: Uuid,
    pub device_id: Option<String>,
    pub metadata: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}
