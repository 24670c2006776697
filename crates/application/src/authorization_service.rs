use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use warden_core::{ActorIdentity, AppError, AppResult, UserId};
use warden_domain::{AdminPermission, PermissionGrant, PermissionMap};

use crate::CacheCoordinator;
use crate::rbac_ports::{AuthorizationRepository, CacheTag};

/// Application service resolving effective user permissions.
///
/// Every read path fails closed: a missing user id or a store failure yields an empty map.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    cache: CacheCoordinator,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>, cache: CacheCoordinator) -> Self {
        Self { repository, cache }
    }

    /// Returns the nested `module -> resource -> actions` map for a user.
    pub async fn user_permissions(&self, user_id: Option<UserId>) -> PermissionMap {
        let Some(user_id) = user_id else {
            return PermissionMap::empty();
        };

        let cache_key = user_permissions_cache_key(user_id);
        if let Some(map) = self.cache.lookup::<PermissionMap>(&cache_key).await {
            return map;
        }

        let grants = match self
            .repository
            .list_permission_grants_for_user(user_id)
            .await
        {
            Ok(grants) => grants,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "permission resolution failed, denying access"
                );
                return PermissionMap::empty();
            }
        };

        let now = Utc::now();
        let map = PermissionMap::from_grants(&grants, now);
        let ttl_cap = PermissionGrant::next_expiry(&grants, now).map(|expires_at| {
            let seconds = (expires_at - now).num_seconds().max(0);
            u32::try_from(seconds).unwrap_or(u32::MAX)
        });

        self.cache
            .store(&cache_key, CacheTag::UserRoles, &map, ttl_cap)
            .await;

        map
    }

    /// Returns whether the user may perform `action` on `resource` inside `module`.
    pub async fn has_permission(
        &self,
        module: &str,
        resource: &str,
        action: &str,
        user_id: Option<UserId>,
    ) -> bool {
        self.user_permissions(user_id)
            .await
            .has_permission(module, resource, action)
    }

    /// Returns whether the user holds any permission inside `module`.
    pub async fn can_access_module(&self, module: &str, user_id: Option<UserId>) -> bool {
        self.user_permissions(user_id)
            .await
            .can_access_module(module)
    }

    /// Ensures the actor holds an administrative capability.
    pub async fn require_permission(
        &self,
        actor: &ActorIdentity,
        permission: AdminPermission,
    ) -> AppResult<()> {
        if self
            .has_permission(
                permission.module(),
                permission.resource(),
                permission.action(),
                Some(actor.user_id()),
            )
            .await
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing permission '{}'",
            actor.user_id(),
            permission.as_str()
        )))
    }
}

/// Returns the cache key of one user's resolved permission map.
#[must_use]
pub fn user_permissions_cache_key(user_id: UserId) -> String {
    format!("user_permissions:{user_id}")
}

#[cfg(test)]
mod tests;
