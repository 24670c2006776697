//! Application services and ports for the RBAC permission engine.

#![forbid(unsafe_code)]

mod audit_recorder;
mod authorization_service;
mod cache_coordinator;
mod rbac_ports;
mod role_admin_service;

pub use audit_recorder::{AuditRecorder, sanitize_changes};
pub use authorization_service::{AuthorizationService, user_permissions_cache_key};
pub use cache_coordinator::CacheCoordinator;
pub use rbac_ports::{
    AssignRoleInput, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository,
    AuditRepository, AuthorizationRepository, CacheTag, CacheTtlConfig, CreateRoleInput,
    DashboardRepository, DashboardStats, NewUserRole, PermissionRepository, RbacCache,
    RoleDetail, RoleListQuery, RolePage, RoleRepository, RoleSummary, UserRoleRepository,
};
pub use role_admin_service::{
    Completion, RoleAdminRepositories, RoleAdminService, RoleDuplication,
    RolePermissionsUpdate,
};
