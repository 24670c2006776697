use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use warden_core::AppResult;

use crate::rbac_ports::{CacheTag, CacheTtlConfig, RbacCache};

/// Read-through cache in front of RBAC reads.
///
/// Backend failures never surface to callers: a failed read is a miss, a failed write or
/// invalidation is logged and dropped.
#[derive(Clone)]
pub struct CacheCoordinator {
    cache: Option<Arc<dyn RbacCache>>,
    ttl: CacheTtlConfig,
}

impl CacheCoordinator {
    /// Creates a coordinator backed by a cache implementation.
    #[must_use]
    pub fn new(cache: Arc<dyn RbacCache>, ttl: CacheTtlConfig) -> Self {
        Self {
            cache: Some(cache),
            ttl,
        }
    }

    /// Creates a coordinator that always misses.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            cache: None,
            ttl: CacheTtlConfig::default(),
        }
    }

    /// Returns the configured TTL policy.
    #[must_use]
    pub fn ttl_config(&self) -> CacheTtlConfig {
        self.ttl
    }

    /// Returns a cached value, treating backend and decode failures as misses.
    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;

        let raw = match cache.get_entry(key).await {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(cache_key = key, error = %error, "rbac cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(cache_key = key, error = %error, "discarding undecodable rbac cache entry");
                None
            }
        }
    }

    /// Stores a value under `key` tagged with `tag`.
    ///
    /// The TTL is the tag policy, lowered to `ttl_cap` when provided. A zero TTL skips the write.
    pub async fn store<T: Serialize>(
        &self,
        key: &str,
        tag: CacheTag,
        value: &T,
        ttl_cap: Option<u32>,
    ) {
        let Some(cache) = &self.cache else {
            return;
        };

        let policy = self.ttl.ttl_for(tag);
        let ttl_seconds = ttl_cap.map_or(policy, |cap| cap.min(policy));
        if ttl_seconds == 0 {
            return;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(cache_key = key, error = %error, "failed to encode rbac cache entry");
                return;
            }
        };

        if let Err(error) = cache.set_entry(key, raw, &[tag], ttl_seconds).await {
            warn!(cache_key = key, error = %error, "rbac cache write failed");
        }
    }

    /// Returns the cached value for `key` or loads, stores and returns it.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, tag: CacheTag, loader: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(value) = self.lookup(key).await {
            return Ok(value);
        }

        let value = loader().await?;
        self.store(key, tag, &value, None).await;
        Ok(value)
    }

    /// Drops every entry indexed by any of `tags`.
    pub async fn invalidate(&self, tags: &[CacheTag]) {
        let Some(cache) = &self.cache else {
            return;
        };

        for tag in tags {
            match cache.invalidate_tag(*tag).await {
                Ok(removed) => debug!(tag = tag.as_str(), removed, "invalidated rbac cache tag"),
                Err(error) => {
                    warn!(tag = tag.as_str(), error = %error, "rbac cache invalidation failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use warden_core::{AppError, AppResult};

    use super::CacheCoordinator;
    use crate::rbac_ports::{CacheTag, CacheTtlConfig, RbacCache};

    #[derive(Default)]
    struct RecordingCache {
        entries: Mutex<HashMap<String, (String, Vec<CacheTag>, u32)>>,
        fail: bool,
    }

    #[async_trait]
    impl RbacCache for RecordingCache {
        async fn get_entry(&self, key: &str) -> AppResult<Option<String>> {
            if self.fail {
                return Err(AppError::Store("cache offline".to_owned()));
            }
            Ok(self.entries.lock().await.get(key).map(|entry| entry.0.clone()))
        }

        async fn set_entry(
            &self,
            key: &str,
            value: String,
            tags: &[CacheTag],
            ttl_seconds: u32,
        ) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Store("cache offline".to_owned()));
            }
            self.entries
                .lock()
                .await
                .insert(key.to_owned(), (value, tags.to_vec(), ttl_seconds));
            Ok(())
        }

        async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<u64> {
            if self.fail {
                return Err(AppError::Store("cache offline".to_owned()));
            }
            let mut entries = self.entries.lock().await;
            let before = entries.len();
            entries.retain(|_, entry| !entry.1.contains(&tag));
            Ok(u64::try_from(before - entries.len()).unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn get_or_load_caches_loaded_value() {
        let cache = Arc::new(RecordingCache::default());
        let coordinator = CacheCoordinator::new(cache.clone(), CacheTtlConfig::default());

        let first = coordinator
            .get_or_load("roles:detail:1", CacheTag::Roles, || async { Ok(7_u32) })
            .await;
        let second = coordinator
            .get_or_load("roles:detail:1", CacheTag::Roles, || async {
                Err::<u32, _>(AppError::Internal("loader must not run".to_owned()))
            })
            .await;

        assert_eq!(first.ok(), Some(7));
        assert_eq!(second.ok(), Some(7));
        let entries = cache.entries.lock().await;
        assert_eq!(entries.get("roles:detail:1").map(|entry| entry.2), Some(1800));
    }

    #[tokio::test]
    async fn ttl_cap_lowers_policy() {
        let cache = Arc::new(RecordingCache::default());
        let coordinator = CacheCoordinator::new(cache.clone(), CacheTtlConfig::default());

        coordinator
            .store("user_permissions:a", CacheTag::UserRoles, &1_u8, Some(42))
            .await;
        coordinator
            .store("user_permissions:b", CacheTag::UserRoles, &1_u8, Some(0))
            .await;

        let entries = cache.entries.lock().await;
        assert_eq!(entries.get("user_permissions:a").map(|entry| entry.2), Some(42));
        assert!(!entries.contains_key("user_permissions:b"));
    }

    #[tokio::test]
    async fn backend_failures_degrade_to_loader() {
        let cache = Arc::new(RecordingCache {
            fail: true,
            ..RecordingCache::default()
        });
        let coordinator = CacheCoordinator::new(cache, CacheTtlConfig::default());

        let value = coordinator
            .get_or_load("dashboard:stats", CacheTag::All, || async { Ok(3_u64) })
            .await;
        coordinator.invalidate(&[CacheTag::All]).await;

        assert_eq!(value.ok(), Some(3));
    }

    #[tokio::test]
    async fn invalidation_drops_only_tagged_entries() {
        let cache = Arc::new(RecordingCache::default());
        let coordinator = CacheCoordinator::new(cache.clone(), CacheTtlConfig::default());

        coordinator.store("roles:list", CacheTag::Roles, &1_u8, None).await;
        coordinator.store("dashboard:stats", CacheTag::All, &1_u8, None).await;
        coordinator.invalidate(&[CacheTag::Roles]).await;

        assert_eq!(coordinator.lookup::<u8>("roles:list").await, None);
        assert_eq!(coordinator.lookup::<u8>("dashboard:stats").await, Some(1));
    }

    #[tokio::test]
    async fn disabled_coordinator_always_loads() {
        let coordinator = CacheCoordinator::disabled();
        coordinator.store("roles:list", CacheTag::Roles, &1_u8, None).await;
        assert_eq!(coordinator.lookup::<u8>("roles:list").await, None);
    }
}
