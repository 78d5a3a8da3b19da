use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Timing gate within a race. At most one checkpoint per race carries
/// `is_start` and at most one carries `is_finish`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Checkpoint {
    pub checkpoint_id: Uuid,
    pub race_id: Uuid,
    pub name: String,
    pub order_index: i32,
    pub is_start: bool,
    pub is_finish: bool,
    pub created_at: DateTime<Utc>,
}
