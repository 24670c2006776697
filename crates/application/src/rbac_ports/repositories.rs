use async_trait::async_trait;

use warden_core::{AppResult, UserId};
use warden_domain::{
    Module, ModuleId, NewRole, PermissionDefinition, PermissionGrant, PermissionId, Role,
    RoleChanges, RoleId, UserRoleAssignment,
};

use super::assignments::NewUserRole;
use super::audit::{AuditEvent, AuditLogEntry, AuditLogQuery};
use super::dashboard::DashboardStats;
use super::roles::{RoleListQuery, RolePage};

/// Repository port for role records and their permission edges.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles matching the query with permission and user counts.
    async fn list_roles(&self, query: &RoleListQuery) -> AppResult<RolePage>;

    /// Finds one role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds one role by name inside a module scope.
    async fn find_role_by_scope(
        &self,
        name: &str,
        module_id: Option<ModuleId>,
    ) -> AppResult<Option<Role>>;

    /// Inserts a non-system role.
    async fn insert_role(&self, role: &NewRole) -> AppResult<Role>;

    /// Writes the mutable role fields and bumps `updated_at`.
    async fn update_role(&self, role_id: RoleId, changes: &RoleChanges) -> AppResult<Role>;

    /// Deletes a role together with its permission edges.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Lists permission ids granted by a role.
    async fn list_role_permission_ids(&self, role_id: RoleId) -> AppResult<Vec<PermissionId>>;

    /// Inserts permission edges, ignoring existing ones.
    async fn insert_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()>;

    /// Deletes permission edges.
    async fn delete_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()>;

    /// Counts users holding a role, expired assignments included.
    async fn count_role_users(&self, role_id: RoleId) -> AppResult<u64>;
}

/// Repository port for module and permission reference data.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists all modules.
    async fn list_modules(&self) -> AppResult<Vec<Module>>;

    /// Finds one module by id.
    async fn find_module(&self, module_id: ModuleId) -> AppResult<Option<Module>>;

    /// Lists permissions of active modules, optionally for one module only.
    async fn list_permissions(
        &self,
        module_id: Option<ModuleId>,
    ) -> AppResult<Vec<PermissionDefinition>>;

    /// Lists permissions granted by one role.
    async fn list_role_permissions(&self, role_id: RoleId)
    -> AppResult<Vec<PermissionDefinition>>;

    /// Finds the permissions matching the given ids; unknown ids are skipped.
    async fn find_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionDefinition>>;
}

/// Repository port for user-role assignments.
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// Returns whether a user is known to the store.
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool>;

    /// Records a user in the local mirror; existing rows are left untouched.
    async fn register_user(&self, user_id: UserId) -> AppResult<()>;

    /// Lists roles held by a user, expired assignments included.
    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>>;

    /// Finds one assignment.
    async fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRoleAssignment>>;

    /// Inserts an assignment; an existing pair yields `AlreadyAssigned` or `Conflict`.
    async fn insert_user_role(&self, assignment: &NewUserRole) -> AppResult<UserRoleAssignment>;

    /// Deletes an assignment and returns whether a row was removed.
    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;
}

/// Repository port for permission resolution.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists every grant reachable from the user's assignments in active modules.
    ///
    /// Expired assignments may be returned; callers filter by `expires_at`.
    async fn list_permission_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>>;
}

/// Repository port for appending audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Repository port for reading audit logs.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Lists most recent audit entries, newest first.
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}

/// Repository port for dashboard aggregates.
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Computes aggregate counts.
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;
}
