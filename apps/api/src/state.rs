use axum::http::HeaderName;
use sqlx::PgPool;
use warden_application::{AuthorizationService, RoleAdminService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_admin_service: RoleAdminService,
    pub authorization_service: AuthorizationService,
    pub identity_header: HeaderName,
    pub postgres_pool: Option<PgPool>,
    pub redis_client: Option<redis::Client>,
}
