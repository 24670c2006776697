use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use warden_application::{AuditLogEntry, AuditLogQuery, AuditLogRepository};
use warden_core::{AppError, AppResult, UserId};

/// PostgreSQL-backed repository for activity log read models.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ActivityLogRow {
    id: uuid::Uuid,
    user_id: Option<uuid::Uuid>,
    action: String,
    module: String,
    resource_type: String,
    resource_id: Option<String>,
    changes: Option<Value>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let capped_limit = i64::try_from(query.limit.clamp(1, 200)).unwrap_or(200);
        let capped_offset = i64::try_from(query.offset.min(10_000)).unwrap_or_default();
        let rows = sqlx::query_as::<_, ActivityLogRow>(
            r#"
            SELECT
                id,
                user_id,
                action,
                COALESCE(module, '') AS module,
                COALESCE(resource_type, '') AS resource_type,
                resource_id,
                changes,
                created_at
            FROM activity_logs
            WHERE ($1::TEXT IS NULL OR action = $1)
                AND ($2::UUID IS NULL OR user_id = $2)
            ORDER BY created_at DESC, id
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(query.action)
        .bind(query.user_id.map(|user_id| user_id.as_uuid()))
        .bind(capped_limit)
        .bind(capped_offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to list activity log: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| AuditLogEntry {
                id: row.id.to_string(),
                user_id: row.user_id.map(UserId::from_uuid),
                action: row.action,
                module: row.module,
                resource_type: row.resource_type,
                resource_id: row.resource_id,
                changes: row.changes,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests;
