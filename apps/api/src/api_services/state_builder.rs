use sqlx::PgPool;
use warden_application::{AuditRecorder, AuthorizationService, RoleAdminService};
use warden_core::AppError;

use crate::api_config::{ApiConfig, RbacCacheBackend};
use crate::state::AppState;

use super::redis::build_redis_client;

mod caches;
mod repositories;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = match config.cache_backend {
        RbacCacheBackend::InMemory => None,
        RbacCacheBackend::Redis => config
            .redis_url
            .as_deref()
            .map(build_redis_client)
            .transpose()?,
    };

    let repositories = repositories::build_repository_set(&pool);
    let cache = caches::build_cache_coordinator(config, redis_client.clone())?;

    let authorization_service =
        AuthorizationService::new(repositories.authorization_repository, cache.clone());
    let role_admin_service = RoleAdminService::new(
        authorization_service.clone(),
        repositories.role_admin_repositories,
        AuditRecorder::new(repositories.audit_repository),
        cache,
    );

    Ok(AppState {
        role_admin_service,
        authorization_service,
        identity_header: config.identity_header.clone(),
        postgres_pool: Some(pool),
        redis_client,
    })
}
