use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use warden_application::{CacheTag, RbacCache};
use warden_core::AppResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    tag_index: HashMap<CacheTag, HashSet<String>>,
}

/// Process-local tag-aware cache adapter.
#[derive(Debug, Default)]
pub struct InMemoryRbacCache {
    state: RwLock<CacheState>,
}

impl InMemoryRbacCache {
    /// Creates an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RbacCache for InMemoryRbacCache {
    async fn get_entry(&self, key: &str) -> AppResult<Option<String>> {
        {
            let state = self.state.read().await;
            match state.entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut state = self.state.write().await;
        if state
            .entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            state.entries.remove(key);
        }

        Ok(None)
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

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut state = self.state.write().await;
        state
            .entries
            .insert(key.to_owned(), CacheEntry { value, expires_at });
        for tag in tags {
            state
                .tag_index
                .entry(*tag)
                .or_default()
                .insert(key.to_owned());
        }

        Ok(())
    }

    async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let Some(keys) = state.tag_index.remove(&tag) else {
            return Ok(0);
        };

        let mut removed = 0_u64;
        for key in keys {
            if state.entries.remove(&key).is_some() {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use warden_application::{CacheTag, RbacCache};

    use super::InMemoryRbacCache;

    #[tokio::test]
    async fn entries_are_returned_until_invalidated() {
        let cache = InMemoryRbacCache::new();
        let stored = cache
            .set_entry("roles:list", "[]".to_owned(), &[CacheTag::Roles], 60)
            .await;
        assert!(stored.is_ok());

        assert_eq!(
            cache.get_entry("roles:list").await.unwrap_or_default(),
            Some("[]".to_owned())
        );
        assert_eq!(cache.invalidate_tag(CacheTag::Roles).await.unwrap_or_default(), 1);
        assert_eq!(cache.get_entry("roles:list").await.unwrap_or_default(), None);
    }

    #[tokio::test]
    async fn invalidation_leaves_other_tags_untouched() {
        let cache = InMemoryRbacCache::new();
        let _ = cache
            .set_entry("roles:list", "[]".to_owned(), &[CacheTag::Roles], 60)
            .await;
        let _ = cache
            .set_entry("dashboard:stats", "{}".to_owned(), &[CacheTag::All], 60)
            .await;

        assert_eq!(cache.invalidate_tag(CacheTag::UserRoles).await.unwrap_or_default(), 0);
        assert_eq!(cache.invalidate_tag(CacheTag::Roles).await.unwrap_or_default(), 1);
        assert!(
            cache
                .get_entry("dashboard:stats")
                .await
                .unwrap_or_default()
                .is_some()
        );
    }

    #[tokio::test]
    async fn zero_ttl_is_not_stored() {
        let cache = InMemoryRbacCache::new();
        let _ = cache
            .set_entry("roles:list", "[]".to_owned(), &[CacheTag::Roles], 0)
            .await;

        assert_eq!(cache.get_entry("roles:list").await.unwrap_or_default(), None);
    }
}
