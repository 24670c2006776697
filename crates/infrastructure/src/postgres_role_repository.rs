use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use warden_application::{RoleListQuery, RolePage, RoleRepository, RoleSummary};
use warden_core::{AppError, AppResult};
use warden_domain::{
    ModuleId, NewRole, PermissionId, Role, RoleChanges, RoleId, RoleSort, SortDirection,
};

/// PostgreSQL-backed repository for roles and role-permission edges.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    display_name: String,
    description: Option<String>,
    module_id: Option<uuid::Uuid>,
    is_system: bool,
    priority: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::from_uuid(row.id),
            name: row.name,
            display_name: row.display_name,
            description: row.description,
            module_id: row.module_id.map(ModuleId::from_uuid),
            is_system: row.is_system,
            priority: row.priority,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleSummaryRow {
    total_count: i64,
    id: Option<uuid::Uuid>,
    name: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    module_id: Option<uuid::Uuid>,
    is_system: Option<bool>,
    priority: Option<i32>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    permission_count: Option<i64>,
    user_count: Option<i64>,
}

impl RoleSummaryRow {
    fn into_summary(self) -> Option<RoleSummary> {
        Some(RoleSummary {
            role: Role {
                id: RoleId::from_uuid(self.id?),
                name: self.name?,
                display_name: self.display_name?,
                description: self.description,
                module_id: self.module_id.map(ModuleId::from_uuid),
                is_system: self.is_system?,
                priority: self.priority?,
                created_at: self.created_at?,
                updated_at: self.updated_at?,
            },
            permission_count: count_to_u64(self.permission_count.unwrap_or_default()),
            user_count: count_to_u64(self.user_count.unwrap_or_default()),
        })
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, query: &RoleListQuery) -> AppResult<RolePage> {
        let order_column = match query.sort {
            RoleSort::Name => "name",
            RoleSort::DisplayName => "display_name",
            RoleSort::Priority => "priority",
            RoleSort::CreatedAt => "created_at",
        };
        let order_direction = match query.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        let search = query.search.as_deref().map(escape_like_pattern);

        let sql = format!(
            r#"
            WITH filtered AS (
                SELECT roles.*
                FROM roles
                WHERE ($1::TEXT IS NULL
                        OR roles.name ILIKE '%' || $1 || '%'
                        OR roles.display_name ILIKE '%' || $1 || '%')
                    AND ($2::UUID IS NULL OR roles.module_id = $2)
                    AND ($3 OR NOT roles.is_system)
            ),
            total AS (
                SELECT COUNT(*) AS total_count FROM filtered
            )
            SELECT
                total.total_count,
                page.id,
                page.name,
                page.display_name,
                page.description,
                page.module_id,
                page.is_system,
                page.priority,
                page.created_at,
                page.updated_at,
                page.permission_count,
                page.user_count
            FROM total
            LEFT JOIN LATERAL (
                SELECT
                    filtered.*,
                    (SELECT COUNT(*) FROM role_permissions WHERE role_id = filtered.id)
                        AS permission_count,
                    (SELECT COUNT(*) FROM user_roles WHERE role_id = filtered.id) AS user_count
                FROM filtered
                ORDER BY filtered.{order_column} {order_direction}, filtered.name ASC
                LIMIT $4
                OFFSET $5
            ) AS page ON true
            "#
        );

        let rows = sqlx::query_as::<_, RoleSummaryRow>(&sql)
            .bind(search)
            .bind(query.module_id.map(|module_id| module_id.as_uuid()))
            .bind(query.include_system)
            .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(query.offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Store(format!("failed to list roles: {error}")))?;

        let total = rows
            .first()
            .map(|row| count_to_u64(row.total_count))
            .unwrap_or_default();

        Ok(RolePage {
            roles: rows
                .into_iter()
                .filter_map(RoleSummaryRow::into_summary)
                .collect(),
            total,
        })
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, description, module_id, is_system, priority,
                created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to find role '{role_id}': {error}")))?;

        Ok(row.map(Role::from))
    }

    async fn find_role_by_scope(
        &self,
        name: &str,
        module_id: Option<ModuleId>,
    ) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, description, module_id, is_system, priority,
                created_at, updated_at
            FROM roles
            WHERE name = $1
                AND module_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(name)
        .bind(module_id.map(|module_id| module_id.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to find role '{name}': {error}")))?;

        Ok(row.map(Role::from))
    }

    async fn insert_role(&self, role: &NewRole) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, display_name, description, module_id, is_system, priority)
            VALUES ($1, $2, $3, $4, false, $5)
            RETURNING id, name, display_name, description, module_id, is_system, priority,
                created_at, updated_at
            "#,
        )
        .bind(role.name())
        .bind(role.display_name())
        .bind(role.description())
        .bind(role.module_id().map(|module_id| module_id.as_uuid()))
        .bind(role.priority())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_role_write_error(error, role.name()))?;

        Ok(row.into())
    }

    async fn update_role(&self, role_id: RoleId, changes: &RoleChanges) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET display_name = $2,
                description = $3,
                priority = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, display_name, description, module_id, is_system, priority,
                created_at, updated_at
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(changes.display_name.as_str())
        .bind(changes.description.as_deref())
        .bind(changes.priority)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to update role '{role_id}': {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        Ok(row.into())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23503")
                {
                    return AppError::Conflict(format!(
                        "role '{role_id}' is still assigned to users"
                    ));
                }

                AppError::Store(format!("failed to delete role '{role_id}': {error}"))
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        Ok(())
    }

    async fn list_role_permission_ids(&self, role_id: RoleId) -> AppResult<Vec<PermissionId>> {
        let ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT permission_id
            FROM role_permissions
            WHERE role_id = $1
            ORDER BY permission_id
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!(
                "failed to list permissions of role '{role_id}': {error}"
            ))
        })?;

        Ok(ids.into_iter().map(PermissionId::from_uuid).collect())
    }

    async fn insert_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let ids = permission_ids
            .iter()
            .map(PermissionId::as_uuid)
            .collect::<Vec<_>>();

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, permission_id
            FROM UNNEST($2::UUID[]) AS permission_id
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!(
                "failed to grant permissions to role '{role_id}': {error}"
            ))
        })?;

        Ok(())
    }

    async fn delete_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let ids = permission_ids
            .iter()
            .map(PermissionId::as_uuid)
            .collect::<Vec<_>>();

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1
                AND permission_id = ANY($2::UUID[])
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!(
                "failed to revoke permissions from role '{role_id}': {error}"
            ))
        })?;

        Ok(())
    }

    async fn count_role_users(&self, role_id: RoleId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!("failed to count users of role '{role_id}': {error}"))
        })?;

        Ok(count_to_u64(count))
    }
}

fn map_role_write_error(error: sqlx::Error, role_name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(format!(
                    "role '{role_name}' already exists in this scope"
                ));
            }
            Some("23503") => {
                return AppError::NotFound(format!(
                    "module of role '{role_name}' does not exist"
                ));
            }
            _ => {}
        }
    }

    AppError::Store(format!("failed to create role '{role_name}': {error}"))
}

fn escape_like_pattern(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn count_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}
