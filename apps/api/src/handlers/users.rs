use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use warden_application::AssignRoleInput;
use warden_core::{ActorIdentity, AppError, UserId};
use warden_domain::RoleId;

use crate::dto::{AssignRoleRequest, UserRoleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<UserRoleResponse>>> {
    let assignments = state
        .role_admin_service
        .list_user_roles(&actor, user_id.parse::<UserId>()?)
        .await?
        .into_iter()
        .map(UserRoleResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<UserRoleResponse>)> {
    let expires_at = payload
        .expires_at
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_timestamp(value.as_str()))
        .transpose()?;

    let assignment = state
        .role_admin_service
        .assign_role(
            &actor,
            AssignRoleInput {
                user_id: user_id.parse::<UserId>()?,
                role_id: payload.role_id.parse::<RoleId>()?,
                expires_at,
                metadata: payload.metadata,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserRoleResponse::from(assignment))))
}

pub async fn remove_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((user_id, role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .remove_role(
            &actor,
            user_id.parse::<UserId>()?,
            role_id.parse::<RoleId>()?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| AppError::Validation(format!("invalid expires_at '{value}': {error}")))
}
