use async_trait::async_trait;
use sqlx::PgPool;

use warden_application::{AuditEvent, AuditRepository};
use warden_core::{AppError, AppResult};

/// PostgreSQL-backed append-only activity log repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                user_id,
                action,
                module,
                resource_type,
                resource_id,
                changes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.actor.map(|actor| actor.as_uuid()))
        .bind(event.action.as_str())
        .bind(event.module)
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.changes)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to append activity log: {error}")))?;

        Ok(())
    }
}
