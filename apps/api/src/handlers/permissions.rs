use axum::Json;
use axum::extract::{Extension, Path, State};
use warden_core::{ActorIdentity, UserId};
use warden_domain::{PermissionId, RoleId};

use crate::dto::{
    CheckPermissionRequest, ModulePermissionGroupResponse, PermissionCheckResponse,
    PermissionMapResponse, PermissionResponse, RolePermissionsUpdateResponse,
    UpdateRolePermissionsRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .role_admin_service
        .get_role_permissions(&actor, role_id.parse::<RoleId>()?)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn update_role_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRolePermissionsRequest>,
) -> ApiResult<Json<RolePermissionsUpdateResponse>> {
    let permission_ids = payload
        .permission_ids
        .iter()
        .map(|value| value.parse::<PermissionId>())
        .collect::<Result<Vec<_>, _>>()?;

    let update = state
        .role_admin_service
        .update_role_permissions(&actor, role_id.parse::<RoleId>()?, permission_ids)
        .await?;

    Ok(Json(RolePermissionsUpdateResponse::from(update)))
}

pub async fn available_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
) -> ApiResult<Json<Vec<ModulePermissionGroupResponse>>> {
    let groups = state
        .role_admin_service
        .get_available_permissions(&actor)
        .await?
        .into_iter()
        .map(ModulePermissionGroupResponse::from)
        .collect();

    Ok(Json(groups))
}

pub async fn my_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
) -> Json<PermissionMapResponse> {
    let map = state
        .authorization_service
        .user_permissions(Some(actor.user_id()))
        .await;

    Json(PermissionMapResponse::new(actor.user_id(), &map))
}

pub async fn user_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PermissionMapResponse>> {
    let user_id = user_id.parse::<UserId>()?;
    let map = state
        .role_admin_service
        .user_permissions(&actor, user_id)
        .await?;

    Ok(Json(PermissionMapResponse::new(user_id, &map)))
}

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(payload): Json<CheckPermissionRequest>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let user_id = payload
        .user_id
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<UserId>())
        .transpose()?
        .unwrap_or_else(|| actor.user_id());

    let allowed = state
        .role_admin_service
        .check_user_permission(
            &actor,
            user_id,
            payload.module.as_str(),
            payload.resource.as_str(),
            payload.action.as_str(),
        )
        .await?;

    Ok(Json(PermissionCheckResponse { allowed }))
}

pub async fn module_access_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(module_name): Path<String>,
) -> Json<PermissionCheckResponse> {
    let allowed = state
        .authorization_service
        .can_access_module(module_name.as_str(), Some(actor.user_id()))
        .await;

    Json(PermissionCheckResponse { allowed })
}
