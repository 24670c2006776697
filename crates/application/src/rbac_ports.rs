mod assignments;
mod audit;
mod cache;
mod dashboard;
mod repositories;
mod roles;

pub use assignments::{AssignRoleInput, NewUserRole};
pub use audit::{AuditEvent, AuditLogEntry, AuditLogQuery};
pub use cache::{CacheTag, CacheTtlConfig, RbacCache};
pub use dashboard::DashboardStats;
pub use repositories::{
    AuditLogRepository, AuditRepository, AuthorizationRepository, DashboardRepository,
    PermissionRepository, RoleRepository, UserRoleRepository,
};
pub use roles::{CreateRoleInput, RoleDetail, RoleListQuery, RolePage, RoleSummary};
