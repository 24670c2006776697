use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;
use warden_core::AppError;

use crate::handlers::{activity, health, permissions, roles, users};
use crate::middleware;
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/roles",
            get(roles::list_roles_handler).post(roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(roles::get_role_handler)
                .put(roles::update_role_handler)
                .delete(roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/duplicate",
            post(roles::duplicate_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            get(permissions::list_role_permissions_handler)
                .put(permissions::update_role_permissions_handler),
        )
        .route(
            "/api/permissions",
            get(permissions::available_permissions_handler),
        )
        .route(
            "/api/permissions/check",
            post(permissions::check_permission_handler),
        )
        .route("/api/me/permissions", get(permissions::my_permissions_handler))
        .route(
            "/api/users/{user_id}/permissions",
            get(permissions::user_permissions_handler),
        )
        .route(
            "/api/modules/{module_name}/access",
            get(permissions::module_access_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(users::list_user_roles_handler).post(users::assign_role_handler),
        )
        .route(
            "/api/users/{user_id}/roles/{role_id}",
            delete(users::remove_role_handler),
        )
        .route(
            "/api/activity-log",
            get(activity::list_activity_log_handler),
        )
        .route(
            "/api/dashboard/stats",
            get(activity::dashboard_stats_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_actor,
        ));

    let cors_layer = cors::build_cors_layer(frontend_url, &app_state.identity_header)?;

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
