use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use warden_application::{NewUserRole, UserRoleRepository};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{ModuleId, RoleId, UserRoleAssignment};

/// PostgreSQL-backed repository for user-role assignments.
#[derive(Clone)]
pub struct PostgresUserRoleRepository {
    pool: PgPool,
}

impl PostgresUserRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    user_id: uuid::Uuid,
    role_id: uuid::Uuid,
    role_name: String,
    role_display_name: String,
    module_id: Option<uuid::Uuid>,
    assigned_by: Option<uuid::Uuid>,
    assigned_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    metadata: Option<Value>,
}

impl From<UserRoleRow> for UserRoleAssignment {
    fn from(row: UserRoleRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            role_id: RoleId::from_uuid(row.role_id),
            role_name: row.role_name,
            role_display_name: row.role_display_name,
            module_id: row.module_id.map(ModuleId::from_uuid),
            assigned_by: row.assigned_by.map(UserId::from_uuid),
            assigned_at: row.assigned_at,
            expires_at: row.expires_at,
            metadata: row.metadata,
        }
    }
}

#[async_trait]
impl UserRoleRepository for PostgresUserRoleRepository {
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to resolve user '{user_id}': {error}"))
            })
    }

    async fn register_user(&self, user_id: UserId) -> AppResult<()> {
        sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|error| {
                AppError::Store(format!("failed to register user '{user_id}': {error}"))
            })
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT
                user_roles.user_id,
                user_roles.role_id,
                roles.name AS role_name,
                roles.display_name AS role_display_name,
                roles.module_id,
                user_roles.assigned_by,
                user_roles.assigned_at,
                user_roles.expires_at,
                user_roles.metadata
            FROM user_roles
            INNER JOIN roles ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
            ORDER BY roles.priority DESC, roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!("failed to list roles of user '{user_id}': {error}"))
        })?;

        Ok(rows.into_iter().map(UserRoleAssignment::from).collect())
    }

    async fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRoleAssignment>> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT
                user_roles.user_id,
                user_roles.role_id,
                roles.name AS role_name,
                roles.display_name AS role_display_name,
                roles.module_id,
                user_roles.assigned_by,
                user_roles.assigned_at,
                user_roles.expires_at,
                user_roles.metadata
            FROM user_roles
            INNER JOIN roles ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
                AND user_roles.role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!("failed to find role assignment: {error}"))
        })?;

        Ok(row.map(UserRoleAssignment::from))
    }

    async fn insert_user_role(&self, assignment: &NewUserRole) -> AppResult<UserRoleAssignment> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            WITH inserted AS (
                INSERT INTO user_roles (user_id, role_id, assigned_by, expires_at, metadata)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING user_id, role_id, assigned_by, assigned_at, expires_at, metadata
            )
            SELECT
                inserted.user_id,
                inserted.role_id,
                roles.name AS role_name,
                roles.display_name AS role_display_name,
                roles.module_id,
                inserted.assigned_by,
                inserted.assigned_at,
                inserted.expires_at,
                inserted.metadata
            FROM inserted
            INNER JOIN roles ON roles.id = inserted.role_id
            "#,
        )
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .bind(assignment.assigned_by.as_uuid())
        .bind(assignment.expires_at)
        .bind(assignment.metadata.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_assignment_error(error, assignment))?;

        Ok(row.into())
    }

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1
                AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to remove role assignment: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}

fn map_assignment_error(error: sqlx::Error, assignment: &NewUserRole) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(format!(
                    "user '{}' already has role '{}'",
                    assignment.user_id, assignment.role_id
                ));
            }
            Some("23503") => {
                return AppError::NotFound(format!(
                    "user '{}' or role '{}' does not exist",
                    assignment.user_id, assignment.role_id
                ));
            }
            _ => {}
        }
    }

    AppError::Store(format!("failed to assign role: {error}"))
}
