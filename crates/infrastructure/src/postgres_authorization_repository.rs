use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use warden_application::AuthorizationRepository;
use warden_core::{AppError, AppResult, UserId};
use warden_domain::PermissionGrant;

/// PostgreSQL-backed repository for permission resolution.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    module_name: String,
    resource: String,
    action: String,
    expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_permission_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                modules.name AS module_name,
                permissions.resource,
                permissions.action,
                user_roles.expires_at
            FROM user_roles
            INNER JOIN role_permissions ON role_permissions.role_id = user_roles.role_id
            INNER JOIN permissions ON permissions.id = role_permissions.permission_id
            INNER JOIN modules ON modules.id = permissions.module_id
            WHERE user_roles.user_id = $1
                AND modules.is_active
                AND (user_roles.expires_at IS NULL OR user_roles.expires_at > now())
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!(
                "failed to load permission grants of user '{user_id}': {error}"
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| PermissionGrant {
                module_name: row.module_name,
                resource: row.resource,
                action: row.action,
                expires_at: row.expires_at,
            })
            .collect())
    }
}
