use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use warden_application::{CreateRoleInput, RoleListQuery};
use warden_core::ActorIdentity;
use warden_domain::{ModuleId, RoleId, RoleSort, RoleUpdate, SortDirection};

use crate::dto::{
    CreateRoleRequest, DuplicateRoleRequest, RoleDetailResponse, RoleDuplicationResponse,
    RolePageResponse, RoleResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListRolesQuery {
    pub search: Option<String>,
    pub module_id: Option<String>,
    pub include_system: Option<bool>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListRolesQuery {
    fn into_role_list_query(self) -> ApiResult<RoleListQuery> {
        let defaults = RoleListQuery::default();

        Ok(RoleListQuery {
            search: self.search,
            module_id: self
                .module_id
                .filter(|value| !value.trim().is_empty())
                .map(|value| value.parse::<ModuleId>())
                .transpose()?,
            include_system: self.include_system.unwrap_or(defaults.include_system),
            sort: self
                .sort
                .map(|value| value.parse::<RoleSort>())
                .transpose()?
                .unwrap_or(defaults.sort),
            direction: self
                .direction
                .map(|value| value.parse::<SortDirection>())
                .transpose()?
                .unwrap_or(defaults.direction),
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
        })
    }
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Query(query): Query<ListRolesQuery>,
) -> ApiResult<Json<RolePageResponse>> {
    let page = state
        .role_admin_service
        .list_roles(&actor, query.into_role_list_query()?)
        .await?;

    Ok(Json(RolePageResponse::from(page)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let module_id = payload
        .module_id
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<ModuleId>())
        .transpose()?;

    let role = state
        .role_admin_service
        .create_role(
            &actor,
            CreateRoleInput {
                name: payload.name,
                display_name: payload.display_name,
                description: payload.description,
                module_id,
                priority: payload.priority,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleDetailResponse>> {
    let detail = state
        .role_admin_service
        .get_role(&actor, role_id.parse::<RoleId>()?)
        .await?;

    Ok(Json(RoleDetailResponse::from(detail)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .update_role(
            &actor,
            role_id.parse::<RoleId>()?,
            RoleUpdate {
                display_name: payload.display_name,
                description: payload.description,
                priority: payload.priority,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .delete_role(&actor, role_id.parse::<RoleId>()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<DuplicateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleDuplicationResponse>)> {
    let duplication = state
        .role_admin_service
        .duplicate_role(&actor, role_id.parse::<RoleId>()?, payload.new_name.as_str())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RoleDuplicationResponse::from(duplication)),
    ))
}
