use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Race {
    pub race_id: Uuid,
    pub name: String,
    pub start_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
