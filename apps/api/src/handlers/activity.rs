use axum::Json;
use axum::extract::{Extension, Query, State};
use serde::Deserialize;
use warden_application::AuditLogQuery;
use warden_core::{ActorIdentity, UserId};

use crate::dto::{ActivityLogEntryResponse, DashboardStatsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityLogQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub user_id: Option<String>,
}

pub async fn list_activity_log_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Query(query): Query<ActivityLogQuery>,
) -> ApiResult<Json<Vec<ActivityLogEntryResponse>>> {
    let user_id = query
        .user_id
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<UserId>())
        .transpose()?;

    let entries = state
        .role_admin_service
        .list_activity_log(
            &actor,
            AuditLogQuery {
                limit: query.limit.unwrap_or(50),
                offset: query.offset.unwrap_or(0),
                action: query.action,
                user_id,
            },
        )
        .await?
        .into_iter()
        .map(ActivityLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn dashboard_stats_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
) -> ApiResult<Json<DashboardStatsResponse>> {
    let stats = state.role_admin_service.dashboard_stats(&actor).await?;

    Ok(Json(DashboardStatsResponse::from(stats)))
}
