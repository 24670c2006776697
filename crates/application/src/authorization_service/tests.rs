use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use warden_core::{ActorIdentity, AppError, AppResult, UserId};
use warden_domain::{AdminPermission, PermissionGrant};

use super::AuthorizationService;
use crate::CacheCoordinator;
use crate::rbac_ports::{AuthorizationRepository, CacheTag, CacheTtlConfig, RbacCache};

#[derive(Default)]
struct FakeAuthorizationRepository {
    grants: HashMap<UserId, Vec<PermissionGrant>>,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn list_permission_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Store("connection reset".to_owned()));
        }
        Ok(self.grants.get(&user_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct FakeCache {
    entries: Mutex<HashMap<String, (String, u32)>>,
}

#[async_trait]
impl RbacCache for FakeCache {
    async fn get_entry(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).map(|entry| entry.0.clone()))
    }

    async fn set_entry(
        &self,
        key: &str,
        value: String,
        _tags: &[CacheTag],
        ttl_seconds: u32,
    ) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), (value, ttl_seconds));
        Ok(())
    }

    async fn invalidate_tag(&self, _tag: CacheTag) -> AppResult<u64> {
        let mut entries = self.entries.lock().await;
        let removed = entries.len();
        entries.clear();
        Ok(u64::try_from(removed).unwrap_or_default())
    }
}

fn grant(module: &str, resource: &str, action: &str) -> PermissionGrant {
    PermissionGrant {
        module_name: module.to_owned(),
        resource: resource.to_owned(),
        action: action.to_owned(),
        expires_at: None,
    }
}

fn service(repository: FakeAuthorizationRepository) -> AuthorizationService {
    AuthorizationService::new(Arc::new(repository), CacheCoordinator::disabled())
}

#[tokio::test]
async fn union_of_roles_is_resolved() {
    let user_id = UserId::new();
    let repository = FakeAuthorizationRepository {
        grants: HashMap::from([(
            user_id,
            vec![
                grant("cms", "article", "read"),
                grant("cms", "article", "publish"),
                grant("cms", "article", "read"),
            ],
        )]),
        ..FakeAuthorizationRepository::default()
    };
    let service = service(repository);

    assert!(
        service
            .has_permission("cms", "article", "publish", Some(user_id))
            .await
    );
    assert!(
        !service
            .has_permission("cms", "article", "delete", Some(user_id))
            .await
    );
    assert!(service.can_access_module("cms", Some(user_id)).await);
    assert!(!service.can_access_module("billing", Some(user_id)).await);
}

#[tokio::test]
async fn missing_user_id_denies_without_store_access() {
    let repository = Arc::new(FakeAuthorizationRepository::default());
    let service = AuthorizationService::new(repository.clone(), CacheCoordinator::disabled());

    assert!(service.user_permissions(None).await.is_empty());
    assert!(!service.has_permission("cms", "article", "read", None).await);
    assert_eq!(repository.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn store_failure_fails_closed() {
    let service = service(FakeAuthorizationRepository {
        fail: true,
        ..FakeAuthorizationRepository::default()
    });

    let user_id = Some(UserId::new());
    assert!(service.user_permissions(user_id).await.is_empty());
    assert!(!service.has_permission("cms", "article", "read", user_id).await);
}

#[tokio::test]
async fn expired_assignment_grants_nothing() {
    let user_id = UserId::new();
    let mut expired = grant("cms", "article", "publish");
    expired.expires_at = Some(Utc::now() - Duration::minutes(1));
    let service = service(FakeAuthorizationRepository {
        grants: HashMap::from([(user_id, vec![expired])]),
        ..FakeAuthorizationRepository::default()
    });

    assert!(
        !service
            .has_permission("cms", "article", "publish", Some(user_id))
            .await
    );
}

#[tokio::test]
async fn resolved_map_is_cached_with_ttl_capped_at_next_expiry() {
    let user_id = UserId::new();
    let mut expiring = grant("cms", "article", "publish");
    expiring.expires_at = Some(Utc::now() + Duration::seconds(90));
    let repository = Arc::new(FakeAuthorizationRepository {
        grants: HashMap::from([(user_id, vec![expiring, grant("cms", "article", "read")])]),
        ..FakeAuthorizationRepository::default()
    });
    let cache = Arc::new(FakeCache::default());
    let service = AuthorizationService::new(
        repository.clone(),
        CacheCoordinator::new(cache.clone(), CacheTtlConfig::default()),
    );

    let first = service.user_permissions(Some(user_id)).await;
    let second = service.user_permissions(Some(user_id)).await;

    assert_eq!(first, second);
    assert_eq!(repository.calls.load(Ordering::SeqCst), 1);
    let ttl = cache
        .entries
        .lock()
        .await
        .get(&format!("user_permissions:{user_id}"))
        .map(|entry| entry.1)
        .unwrap_or_default();
    assert!(ttl > 0 && ttl <= 90);
}

#[tokio::test]
async fn require_permission_returns_forbidden_without_grant() {
    let user_id = UserId::new();
    let service = service(FakeAuthorizationRepository {
        grants: HashMap::from([(user_id, vec![grant("user_management", "roles", "read")])]),
        ..FakeAuthorizationRepository::default()
    });
    let actor = ActorIdentity::new(user_id);

    assert!(
        service
            .require_permission(&actor, AdminPermission::RolesRead)
            .await
            .is_ok()
    );
    let denied = service
        .require_permission(&actor, AdminPermission::RolesDelete)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}
