use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use warden_core::{ActorIdentity, AppError, AppResult, UserId};
use warden_domain::{AdminPermission, AuditAction, Role, RoleId, USER_MANAGEMENT_MODULE};

use crate::rbac_ports::{
    AuditEvent, AuditLogRepository, CacheTag, DashboardRepository, PermissionRepository,
    RoleRepository, UserRoleRepository,
};
use crate::{AuditRecorder, AuthorizationService, CacheCoordinator};

mod activity;
mod assignments;
mod permissions;
mod roles;


const ROLE_RESOURCE_TYPE: &str = "role";
const USER_ROLE_RESOURCE_TYPE: &str = "user_role";

/// Outcome of a two-phase write that is not atomic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completion {
    /// Every phase succeeded.
    Complete,
    /// The first phase committed but a later one failed.
    Partial {
        /// Failure reported by the store for the failed phase.
        reason: String,
    },
}

impl Completion {
    /// Returns whether every phase succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Result of duplicating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDuplication {
    /// Newly created role.
    pub role: Role,
    /// Number of permission edges copied from the source role.
    pub copied_permissions: usize,
    /// Whether edge copying finished.
    pub completion: Completion,
}

/// Result of replacing a role's permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionsUpdate {
    /// Number of permissions added.
    pub added: usize,
    /// Number of permissions removed.
    pub removed: usize,
    /// Number of permissions the role grants afterwards.
    pub total: usize,
    /// Whether the addition phase finished.
    pub completion: Completion,
}

/// Store ports needed by the role administration service.
#[derive(Clone)]
pub struct RoleAdminRepositories {
    /// Role records and permission edges.
    pub roles: Arc<dyn RoleRepository>,
    /// Modules and permission reference data.
    pub permissions: Arc<dyn PermissionRepository>,
    /// User-role assignments.
    pub user_roles: Arc<dyn UserRoleRepository>,
    /// Activity log reads.
    pub audit_log: Arc<dyn AuditLogRepository>,
    /// Dashboard aggregates.
    pub dashboard: Arc<dyn DashboardRepository>,
}

/// Application service guarding every RBAC mutation.
#[derive(Clone)]
pub struct RoleAdminService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
    dashboard_repository: Arc<dyn DashboardRepository>,
    audit_recorder: AuditRecorder,
    cache: CacheCoordinator,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repositories: RoleAdminRepositories,
        audit_recorder: AuditRecorder,
        cache: CacheCoordinator,
    ) -> Self {
        Self {
            authorization_service,
            role_repository: repositories.roles,
            permission_repository: repositories.permissions,
            user_role_repository: repositories.user_roles,
            audit_log_repository: repositories.audit_log,
            dashboard_repository: repositories.dashboard,
            audit_recorder,
            cache,
        }
    }

    async fn require(&self, actor: &ActorIdentity, permission: AdminPermission) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission)
            .await
    }

    async fn require_self_or(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
        permission: AdminPermission,
    ) -> AppResult<()> {
        if actor.user_id() == user_id {
            return Ok(());
        }

        self.require(actor, permission).await
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn record(
        &self,
        actor: &ActorIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        changes: Value,
    ) {
        self.audit_recorder
            .record(AuditEvent {
                actor: Some(actor.user_id()),
                action,
                module: USER_MANAGEMENT_MODULE.to_owned(),
                resource_type: resource_type.to_owned(),
                resource_id: Some(resource_id),
                changes: Some(changes),
            })
            .await;
    }

    async fn invalidate(&self, tags: &[CacheTag]) {
        self.cache.invalidate(tags).await;
    }
}
