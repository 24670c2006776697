use std::sync::Arc;

use warden_application::{CacheCoordinator, RbacCache};
use warden_core::{AppError, AppResult};
use warden_infrastructure::{InMemoryRbacCache, RedisRbacCache};

use crate::api_config::{ApiConfig, RbacCacheBackend};

pub(super) fn build_cache_coordinator(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> AppResult<CacheCoordinator> {
    let cache: Arc<dyn RbacCache> = match config.cache_backend {
        RbacCacheBackend::InMemory => Arc::new(InMemoryRbacCache::new()),
        RbacCacheBackend::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when RBAC_CACHE_BACKEND=redis".to_owned(),
                )
            })?;
            Arc::new(RedisRbacCache::new(redis_client, "warden:rbac"))
        }
    };

    Ok(CacheCoordinator::new(cache, config.cache_ttl))
}
