//! Redis-backed tag-aware RBAC cache.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use warden_application::{CacheTag, RbacCache};
use warden_core::{AppError, AppResult};

/// Redis implementation of the RBAC cache port.
///
/// Entries live under `{prefix}:entry:{key}` with a native expiry. Each tag keeps a set of entry
/// keys under `{prefix}:tag:{tag}` whose expiry follows its longest-lived member, so members of
/// expired entries are pruned with the set. Invalidation removes only the members it read.
#[derive(Clone)]
pub struct RedisRbacCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisRbacCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn entry_key(&self, key: &str) -> String {
        format!("{}:entry:{key}", self.key_prefix)
    }

    fn tag_key(&self, tag: CacheTag) -> String {
        format!("{}:tag:{}", self.key_prefix, tag.as_str())
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Store(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl RbacCache for RedisRbacCache {
    async fn get_entry(&self, key: &str) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;

        connection
            .get(self.entry_key(key))
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to read rbac cache entry '{key}': {error}"))
            })
    }

    async fn set_entry(
        &self,
        key: &str,
        value: String,
        tags: &[CacheTag],
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let entry_key = self.entry_key(key);
        let mut pipeline = redis::pipe();
        pipeline
            .atomic()
            .set_ex(&entry_key, value, u64::from(ttl_seconds))
            .ignore();
        for tag in tags {
            let tag_key = self.tag_key(*tag);
            pipeline.sadd(&tag_key, &entry_key).ignore();
            // NX arms a fresh set, GT only ever extends it; requires Redis 7.
            for option in ["NX", "GT"] {
                pipeline
                    .cmd("EXPIRE")
                    .arg(&tag_key)
                    .arg(ttl_seconds)
                    .arg(option)
                    .ignore();
            }
        }

        let mut connection = self.connection().await?;
        pipeline
            .query_async::<()>(&mut connection)
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to write rbac cache entry '{key}': {error}"))
            })
    }

    async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<u64> {
        let tag_key = self.tag_key(tag);
        let mut connection = self.connection().await?;

        let entry_keys: Vec<String> = connection.smembers(&tag_key).await.map_err(|error| {
            AppError::Store(format!(
                "failed to read rbac cache tag '{}': {error}",
                tag.as_str()
            ))
        })?;

        if entry_keys.is_empty() {
            return Ok(0);
        }

        let mut pipeline = redis::pipe();
        pipeline
            .atomic()
            .del(&entry_keys)
            .srem(&tag_key, &entry_keys)
            .ignore();
        let (removed,): (u64,) = pipeline
            .query_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Store(format!(
                    "failed to drop rbac cache entries of tag '{}': {error}",
                    tag.as_str()
                ))
            })?;

        debug!(tag = tag.as_str(), removed, "dropped redis rbac cache tag");
        Ok(removed)
    }
}
