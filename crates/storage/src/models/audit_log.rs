use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Undo,
}

/// Immutable audit record. `before_state` / `after_state` hold JSON
/// snapshots of the mutated entity; there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLogEntry {
    pub audit_id: Uuid,
    pub race_id: Uuid,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub action: AuditAction,
    pub user_id: Option<String>,
    pub before_state: Option<String>,
    pub after_state: Option<String>,
    pub reason: Option<String>,
    pub ts: DateTime<Utc>,
}
