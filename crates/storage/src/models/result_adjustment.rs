use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One manual time correction. Kept separate from the result cache so a
/// full recompute re-applies the sum instead of discarding it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResultAdjustment {
    pub adjustment_id: Uuid,
    pub race_id: Uuid,
    pub participant_id: Uuid,
    pub adjustment_ms: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
