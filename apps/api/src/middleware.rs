use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use warden_core::{ActorIdentity, AppError, UserId};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_actor(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let actor = resolve_actor(request.headers(), &state).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

async fn resolve_actor(
    headers: &axum::http::HeaderMap,
    state: &AppState,
) -> Result<ActorIdentity, AppError> {
    let actor = actor_from_headers(headers, state)?;
    state.role_admin_service.register_actor(&actor).await?;

    Ok(actor)
}

fn actor_from_headers(
    headers: &axum::http::HeaderMap,
    state: &AppState,
) -> Result<ActorIdentity, AppError> {
    let raw_user_id = headers
        .get(&state.identity_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let user_id = raw_user_id
        .parse::<UserId>()
        .map_err(|_| AppError::Unauthorized("invalid identity header".to_owned()))?;

    Ok(ActorIdentity::new(user_id))
}
