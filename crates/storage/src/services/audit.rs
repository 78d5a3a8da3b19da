use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AuditAction, AuditLogEntry};
use crate::repository::audit_log::AuditLogRepository;

pub const ENTITY_TIMING_EVENT: &str = "TimingEvent";
pub const ENTITY_RESULT_CACHE: &str = "ResultCache";

/// One audit entry to append. `before` / `after` are JSON snapshots of the
/// mutated entity around the operation.
pub struct AuditRecord {
    pub race_id: Uuid,
    pub entity_type: &'static str,
    pub entity_id: Option<Uuid>,
    pub action: AuditAction,
    pub user_id: Option<String>,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub reason: Option<String>,
}

impl AuditRecord {
    pub fn new(race_id: Uuid, entity_type: &'static str, action: AuditAction) -> Self {
        Self {
            race_id,
            entity_type,
            entity_id: None,
            action,
            user_id: None,
            before: None,
            after: None,
            reason: None,
        }
    }

    pub fn entity(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn user(mut self, user_id: Option<&str>) -> Self {
        self.user_id = user_id.map(String::from);
        self
    }

    pub fn before(mut self, snapshot: serde_json::Value) -> Self {
        self.before = Some(snapshot);
        self
    }

    pub fn after(mut self, snapshot: serde_json::Value) -> Self {
        self.after = Some(snapshot);
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Append one immutable entry. Generic over the executor so mutations can
/// write their audit entry inside the same transaction.
pub async fn record<'e, E>(executor: E, rec: AuditRecord) -> Result<AuditLogEntry>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let entry = sqlx::query_as::<_, AuditLogEntry>(
        r#"
        INSERT INTO audit_log (audit_id, race_id, entity_type, entity_id, action, user_id,
                               before_state, after_state, reason, ts)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING audit_id, race_id, entity_type, entity_id, action, user_id,
                  before_state, after_state, reason, ts
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(rec.race_id)
    .bind(rec.entity_type)
    .bind(rec.entity_id)
    .bind(rec.action)
    .bind(rec.user_id)
    .bind(rec.before.map(|v| v.to_string()))
    .bind(rec.after.map(|v| v.to_string()))
    .bind(rec.reason)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(entry)
}

pub async fn entity_history(
    pool: &SqlitePool,
    entity_type: &str,
    entity_id: Uuid,
) -> Result<Vec<AuditLogEntry>> {
    AuditLogRepository::new(pool)
        .entity_history(entity_type, entity_id)
        .await
}

pub async fn race_history(
    pool: &SqlitePool,
    race_id: Uuid,
    limit: i64,
) -> Result<Vec<AuditLogEntry>> {
    AuditLogRepository::new(pool).race_history(race_id, limit).await
}
