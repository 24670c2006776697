use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderName, StatusCode};
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use serde_json::Value;
use warden_application::{
    AuditRecorder, AuthorizationService, CacheCoordinator, CacheTtlConfig, NewUserRole,
    RoleAdminRepositories, RoleAdminService, UserRoleRepository,
};
use warden_core::{ActorIdentity, UserId};
use warden_domain::{PermissionDefinition, USER_MANAGEMENT_MODULE};
use warden_infrastructure::{InMemoryRbacCache, InMemoryRbacStore};

use super::{activity, health, permissions, roles, users};
use crate::dto::{
    AssignRoleRequest, CheckPermissionRequest, CreateRoleRequest, DuplicateRoleRequest,
    UpdateRolePermissionsRequest, UpdateRoleRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

pub(crate) struct Fixture {
    pub(crate) store: Arc<InMemoryRbacStore>,
    pub(crate) admin: ActorIdentity,
    pub(crate) read: PermissionDefinition,
    pub(crate) publish: PermissionDefinition,
}

pub(crate) async fn in_memory_state() -> (AppState, Fixture) {
    let store = Arc::new(InMemoryRbacStore::new());
    let super_admin = store
        .seed_user_management()
        .await
        .unwrap_or_else(|_| unreachable!());
    let cms = store
        .insert_module("cms", "Content", true)
        .await
        .unwrap_or_else(|_| unreachable!());
    let read = store
        .insert_permission(cms.id, "article", "read", None)
        .await
        .unwrap_or_else(|_| unreachable!());
    let publish = store
        .insert_permission(cms.id, "article", "publish", None)
        .await
        .unwrap_or_else(|_| unreachable!());

    let admin_id = UserId::new();
    store.insert_user(admin_id).await;
    let assigned = store
        .insert_user_role(&NewUserRole {
            user_id: admin_id,
            role_id: super_admin.id,
            assigned_by: admin_id,
            expires_at: None,
            metadata: None,
        })
        .await;
    assert!(assigned.is_ok());

    let cache = CacheCoordinator::new(
        Arc::new(InMemoryRbacCache::new()),
        CacheTtlConfig::default(),
    );
    let authorization_service = AuthorizationService::new(store.clone(), cache.clone());
    let role_admin_service = RoleAdminService::new(
        authorization_service.clone(),
        RoleAdminRepositories {
            roles: store.clone(),
            permissions: store.clone(),
            user_roles: store.clone(),
            audit_log: store.clone(),
            dashboard: store.clone(),
        },
        AuditRecorder::new(store.clone()),
        cache,
    );

    let state = AppState {
        role_admin_service,
        authorization_service,
        identity_header: HeaderName::from_static("x-user-id"),
        postgres_pool: None,
        redis_client: None,
    };

    (
        state,
        Fixture {
            store,
            admin: ActorIdentity::new(admin_id),
            read,
            publish,
        },
    )
}

fn status_of<T>(result: Result<T, ApiError>) -> Option<StatusCode> {
    result.err().map(|error| error.into_response().status())
}

async fn create_editor(state: &AppState, fixture: &Fixture) -> String {
    let created = roles::create_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Json(CreateRoleRequest {
            name: "editor".to_owned(),
            display_name: "Editor".to_owned(),
            description: Some("Edits articles".to_owned()),
            module_id: None,
            priority: Some(10),
        }),
    )
    .await;

    let Ok((status, Json(role))) = created else {
        panic!("role creation failed");
    };
    assert_eq!(status, StatusCode::CREATED);
    role.role_id
}

#[tokio::test]
async fn role_lifecycle_through_handlers() {
    let (state, fixture) = in_memory_state().await;
    let role_id = create_editor(&state, &fixture).await;

    let updated = roles::update_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(role_id.clone()),
        Json(UpdateRoleRequest {
            priority: Some(25),
            ..UpdateRoleRequest::default()
        }),
    )
    .await;
    assert_eq!(updated.ok().map(|Json(role)| role.priority), Some(25));

    let permissions = permissions::update_role_permissions_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(role_id.clone()),
        Json(UpdateRolePermissionsRequest {
            permission_ids: vec![fixture.read.id.to_string(), fixture.publish.id.to_string()],
        }),
    )
    .await;
    let Ok(Json(permissions)) = permissions else {
        panic!("permission update failed");
    };
    assert_eq!(permissions.added, 2);
    assert_eq!(permissions.completion.status, "complete");

    let duplicated = roles::duplicate_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(role_id.clone()),
        Json(DuplicateRoleRequest {
            new_name: "editor_copy".to_owned(),
        }),
    )
    .await;
    let Ok((status, Json(duplication))) = duplicated else {
        panic!("duplication failed");
    };
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(duplication.copied_permissions, 2);
    assert_eq!(duplication.role.display_name, "Editor (Copy)");

    let detail = roles::get_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(duplication.role.role_id.clone()),
    )
    .await;
    assert_eq!(
        detail.ok().map(|Json(detail)| detail.permissions.len()),
        Some(2)
    );

    let page = roles::list_roles_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Query(roles::ListRolesQuery {
            include_system: Some(false),
            sort: Some("name".to_owned()),
            direction: Some("asc".to_owned()),
            ..roles::ListRolesQuery::default()
        }),
    )
    .await;
    let Ok(Json(page)) = page else {
        panic!("role listing failed");
    };
    assert_eq!(page.total, 2);
    assert_eq!(page.roles[0].role.name, "editor");

    let deleted = roles::delete_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(duplication.role.role_id),
    )
    .await;
    assert_eq!(deleted.ok(), Some(StatusCode::NO_CONTENT));
}

#[tokio::test]
async fn assigned_role_deletion_reports_user_count() {
    let (state, fixture) = in_memory_state().await;
    let role_id = create_editor(&state, &fixture).await;
    let user_id = UserId::new();
    fixture.store.insert_user(user_id).await;

    let assigned = users::assign_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(user_id.to_string()),
        Json(AssignRoleRequest {
            role_id: role_id.clone(),
            expires_at: None,
            metadata: None,
        }),
    )
    .await;
    assert_eq!(
        assigned.ok().map(|(status, _)| status),
        Some(StatusCode::CREATED)
    );

    let deleted = roles::delete_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(role_id.clone()),
    )
    .await;
    let Err(error) = deleted else {
        panic!("assigned role must not be deleted");
    };
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let payload = serde_json::from_slice::<Value>(&body).unwrap_or_default();
    assert_eq!(payload["user_count"], 1);

    let duplicate = users::assign_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(user_id.to_string()),
        Json(AssignRoleRequest {
            role_id: role_id.clone(),
            expires_at: None,
            metadata: None,
        }),
    )
    .await;
    assert_eq!(status_of(duplicate), Some(StatusCode::CONFLICT));

    let removed = users::remove_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path((user_id.to_string(), role_id.clone())),
    )
    .await;
    assert_eq!(removed.ok(), Some(StatusCode::NO_CONTENT));

    let removed_again = users::remove_role_handler(
        State(state),
        Extension(fixture.admin.clone()),
        Path((user_id.to_string(), role_id)),
    )
    .await;
    assert_eq!(status_of(removed_again), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn permission_checks_follow_assignments() {
    let (state, fixture) = in_memory_state().await;
    let role_id = create_editor(&state, &fixture).await;
    let granted = permissions::update_role_permissions_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(role_id.clone()),
        Json(UpdateRolePermissionsRequest {
            permission_ids: vec![fixture.read.id.to_string()],
        }),
    )
    .await;
    assert!(granted.is_ok());

    let user_id = UserId::new();
    fixture.store.insert_user(user_id).await;
    let user = ActorIdentity::new(user_id);

    let access = permissions::module_access_handler(
        State(state.clone()),
        Extension(user.clone()),
        Path("cms".to_owned()),
    )
    .await;
    assert!(!access.0.allowed);

    let assigned = users::assign_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(user_id.to_string()),
        Json(AssignRoleRequest {
            role_id,
            expires_at: Some((Utc::now() + Duration::hours(1)).to_rfc3339()),
            metadata: Some(serde_json::json!({ "ticket": "OPS-12" })),
        }),
    )
    .await;
    assert!(assigned.is_ok());

    let access = permissions::module_access_handler(
        State(state.clone()),
        Extension(user.clone()),
        Path("cms".to_owned()),
    )
    .await;
    assert!(access.0.allowed);

    let own_check = permissions::check_permission_handler(
        State(state.clone()),
        Extension(user.clone()),
        Json(CheckPermissionRequest {
            module: "cms".to_owned(),
            resource: "article".to_owned(),
            action: "publish".to_owned(),
            user_id: None,
        }),
    )
    .await;
    assert_eq!(own_check.ok().map(|Json(check)| check.allowed), Some(false));

    let admin_check = permissions::check_permission_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Json(CheckPermissionRequest {
            module: "cms".to_owned(),
            resource: "article".to_owned(),
            action: "read".to_owned(),
            user_id: Some(user_id.to_string()),
        }),
    )
    .await;
    assert_eq!(admin_check.ok().map(|Json(check)| check.allowed), Some(true));

    let Json(map) =
        permissions::my_permissions_handler(State(state.clone()), Extension(user.clone())).await;
    assert_eq!(map.permissions["cms"]["article"], vec!["read".to_owned()]);

    let peeking = permissions::user_permissions_handler(
        State(state),
        Extension(user),
        Path(fixture.admin.user_id().to_string()),
    )
    .await;
    assert_eq!(status_of(peeking), Some(StatusCode::FORBIDDEN));
}

#[tokio::test]
async fn malformed_input_is_rejected_as_bad_request() {
    let (state, fixture) = in_memory_state().await;
    let role_id = create_editor(&state, &fixture).await;

    let bad_path = roles::get_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path("not-a-role".to_owned()),
    )
    .await;
    assert_eq!(status_of(bad_path), Some(StatusCode::BAD_REQUEST));

    let bad_sort = roles::list_roles_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Query(roles::ListRolesQuery {
            sort: Some("popularity".to_owned()),
            ..roles::ListRolesQuery::default()
        }),
    )
    .await;
    assert_eq!(status_of(bad_sort), Some(StatusCode::BAD_REQUEST));

    let past_expiry = users::assign_role_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Path(fixture.admin.user_id().to_string()),
        Json(AssignRoleRequest {
            role_id: role_id.clone(),
            expires_at: Some((Utc::now() - Duration::minutes(5)).to_rfc3339()),
            metadata: None,
        }),
    )
    .await;
    assert_eq!(status_of(past_expiry), Some(StatusCode::BAD_REQUEST));

    let garbled_expiry = users::assign_role_handler(
        State(state),
        Extension(fixture.admin.clone()),
        Path(fixture.admin.user_id().to_string()),
        Json(AssignRoleRequest {
            role_id,
            expires_at: Some("tomorrow".to_owned()),
            metadata: None,
        }),
    )
    .await;
    assert_eq!(status_of(garbled_expiry), Some(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn activity_and_dashboard_require_admin_permissions() {
    let (state, fixture) = in_memory_state().await;
    create_editor(&state, &fixture).await;

    let entries = activity::list_activity_log_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
        Query(activity::ActivityLogQuery::default()),
    )
    .await;
    let Ok(Json(entries)) = entries else {
        panic!("activity log listing failed");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "role_created");
    assert_eq!(entries[0].module, USER_MANAGEMENT_MODULE);

    let stats = activity::dashboard_stats_handler(
        State(state.clone()),
        Extension(fixture.admin.clone()),
    )
    .await;
    assert_eq!(stats.ok().map(|Json(stats)| stats.total_roles), Some(2));

    let outsider = ActorIdentity::new(UserId::new());
    let forbidden = activity::list_activity_log_handler(
        State(state.clone()),
        Extension(outsider.clone()),
        Query(activity::ActivityLogQuery::default()),
    )
    .await;
    assert_eq!(status_of(forbidden), Some(StatusCode::FORBIDDEN));

    let groups = permissions::available_permissions_handler(State(state), Extension(outsider))
        .await;
    assert_eq!(status_of(groups), Some(StatusCode::FORBIDDEN));
}

#[tokio::test]
async fn health_reports_disabled_dependencies_as_ready() {
    let (state, _) = in_memory_state().await;
    let (status, Json(health)) = health::health_handler(State(state)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(health.ready);
    assert_eq!(health.postgres.status, "disabled");
    assert_eq!(health.redis.status, "disabled");
}
