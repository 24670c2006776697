use async_trait::async_trait;
use warden_core::AppResult;

/// Invalidation group attached to cached entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheTag {
    /// Role lists, role details and role permission sets.
    Roles,
    /// Per-user resolved permission maps.
    UserRoles,
    /// Cross-cutting aggregates such as dashboard counts.
    All,
}

impl CacheTag {
    /// Returns the stable tag name used by cache backends.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::UserRoles => "user_roles",
            Self::All => "all",
        }
    }
}

/// Per-tag time-to-live policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtlConfig {
    /// TTL for role data.
    pub roles_seconds: u32,
    /// TTL for per-user permission maps.
    pub user_roles_seconds: u32,
    /// TTL for dashboard aggregates.
    pub dashboard_seconds: u32,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            roles_seconds: 1800,
            user_roles_seconds: 300,
            dashboard_seconds: 60,
        }
    }
}

impl CacheTtlConfig {
    /// Returns the TTL policy for entries tagged with `tag`.
    #[must_use]
    pub fn ttl_for(&self, tag: CacheTag) -> u32 {
        match tag {
            CacheTag::Roles => self.roles_seconds,
            CacheTag::UserRoles => self.user_roles_seconds,
            CacheTag::All => self.dashboard_seconds,
        }
    }
}

/// Optional tag-aware cache port for serialized read results.
#[async_trait]
pub trait RbacCache: Send + Sync {
    /// Returns the serialized entry for `key` when present and not expired.
    async fn get_entry(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores a serialized entry under `key`, indexed by `tags`, with ttl.
    async fn set_entry(
        &self,
        key: &str,
        value: String,
        tags: &[CacheTag],
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops every entry indexed by `tag` and returns how many were removed.
    async fn invalidate_tag(&self, tag: CacheTag) -> AppResult<u64>;
}
