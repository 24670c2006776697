use std::sync::Arc;

use sqlx::PgPool;
use warden_application::{AuditRepository, AuthorizationRepository, RoleAdminRepositories};
use warden_infrastructure::{
    PostgresAuditLogRepository, PostgresAuditRepository, PostgresAuthorizationRepository,
    PostgresDashboardRepository, PostgresPermissionRepository, PostgresRoleRepository,
    PostgresUserRoleRepository,
};

pub(super) struct RepositorySet {
    pub(super) role_admin_repositories: RoleAdminRepositories,
    pub(super) authorization_repository: Arc<dyn AuthorizationRepository>,
    pub(super) audit_repository: Arc<dyn AuditRepository>,
}

pub(super) fn build_repository_set(pool: &PgPool) -> RepositorySet {
    RepositorySet {
        role_admin_repositories: RoleAdminRepositories {
            roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
            permissions: Arc::new(PostgresPermissionRepository::new(pool.clone())),
            user_roles: Arc::new(PostgresUserRoleRepository::new(pool.clone())),
            audit_log: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
            dashboard: Arc::new(PostgresDashboardRepository::new(pool.clone())),
        },
        authorization_repository: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
    }
}
