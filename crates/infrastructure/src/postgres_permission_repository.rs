use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use warden_application::PermissionRepository;
use warden_core::{AppError, AppResult};
use warden_domain::{Module, ModuleId, PermissionDefinition, PermissionId, RoleId};

/// PostgreSQL-backed repository for module and permission reference data.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ModuleRow {
    id: uuid::Uuid,
    name: String,
    display_name: String,
    is_active: bool,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Self {
            id: ModuleId::from_uuid(row.id),
            name: row.name,
            display_name: row.display_name,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: uuid::Uuid,
    module_id: uuid::Uuid,
    module_name: String,
    module_display_name: String,
    resource: String,
    action: String,
    description: Option<String>,
}

impl From<PermissionRow> for PermissionDefinition {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: PermissionId::from_uuid(row.id),
            module_id: ModuleId::from_uuid(row.module_id),
            module_name: row.module_name,
            module_display_name: row.module_display_name,
            resource: row.resource,
            action: row.action,
            description: row.description,
        }
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn list_modules(&self) -> AppResult<Vec<Module>> {
        let rows = sqlx::query_as::<_, ModuleRow>(
            r#"
            SELECT id, name, display_name, is_active
            FROM modules
            ORDER BY display_name, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to list modules: {error}")))?;

        Ok(rows.into_iter().map(Module::from).collect())
    }

    async fn find_module(&self, module_id: ModuleId) -> AppResult<Option<Module>> {
        let row = sqlx::query_as::<_, ModuleRow>(
            r#"
            SELECT id, name, display_name, is_active
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(module_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!("failed to find module '{module_id}': {error}"))
        })?;

        Ok(row.map(Module::from))
    }

    async fn list_permissions(
        &self,
        module_id: Option<ModuleId>,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT
                permissions.id,
                permissions.module_id,
                modules.name AS module_name,
                modules.display_name AS module_display_name,
                permissions.resource,
                permissions.action,
                permissions.description
            FROM permissions
            INNER JOIN modules ON modules.id = permissions.module_id
            WHERE modules.is_active
                AND ($1::UUID IS NULL OR permissions.module_id = $1)
            ORDER BY modules.display_name, permissions.resource, permissions.action
            "#,
        )
        .bind(module_id.map(|module_id| module_id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to list permissions: {error}")))?;

        Ok(rows.into_iter().map(PermissionDefinition::from).collect())
    }

    async fn list_role_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT
                permissions.id,
                permissions.module_id,
                modules.name AS module_name,
                modules.display_name AS module_display_name,
                permissions.resource,
                permissions.action,
                permissions.description
            FROM role_permissions
            INNER JOIN permissions ON permissions.id = role_permissions.permission_id
            INNER JOIN modules ON modules.id = permissions.module_id
            WHERE role_permissions.role_id = $1
            ORDER BY modules.display_name, permissions.resource, permissions.action
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

        Ok(rows.into_iter().map(PermissionDefinition::from).collect())
    }

    async fn find_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionDefinition>> {
        let ids = permission_ids
            .iter()
            .map(PermissionId::as_uuid)
            .collect::<Vec<_>>();

        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT
                permissions.id,
                permissions.module_id,
                modules.name AS module_name,
                modules.display_name AS module_display_name,
                permissions.resource,
                permissions.action,
                permissions.description
            FROM permissions
            INNER JOIN modules ON modules.id = permissions.module_id
            WHERE permissions.id = ANY($1::UUID[])
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to resolve permissions: {error}")))?;

        Ok(rows.into_iter().map(PermissionDefinition::from).collect())
    }
}
