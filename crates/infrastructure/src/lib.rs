//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_rbac_cache;
mod in_memory_rbac_store;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_dashboard_repository;
mod postgres_permission_repository;
mod postgres_role_repository;
mod postgres_user_role_repository;
mod redis_rbac_cache;

pub use in_memory_rbac_cache::InMemoryRbacCache;
pub use in_memory_rbac_store::InMemoryRbacStore;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_dashboard_repository::PostgresDashboardRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_role_repository::PostgresUserRoleRepository;
pub use redis_rbac_cache::RedisRbacCache;
