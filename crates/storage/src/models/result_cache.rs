use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Derived leaderboard row, one per (race, participant). Fully rebuilt by
/// the results refresh and individually patched by category and adjustment
/// operations. `version` backs the optimistic write check on patches.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResultCacheEntry {
    pub result_id: Uuid,
    pub race_id: Uuid,
    pub participant_id: Uuid,
    pub registration_id: Option<Uuid>,
    pub gun_time_ms: Option<i64>,
    pub chip_time_ms: Option<i64>,
    pub net_time_ms: Option<i64>,
    pub place: Option<i32>,
    pub category: Option<String>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl ResultCacheEntry {
    /// Category value marking a disqualified participant.
    pub const DISQUALIFIED: &'static str = "DQ";

    pub fn is_disqualified(&self) -> bool {
        self.category.as_deref() == Some(Self::DISQUALIFIED)
    }
}
