use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participant {
    pub participant_id: Uuid,
    pub race_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}
