use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use warden_core::AppError;

pub(crate) mod types;

use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::RoleInUse { .. }
            | AppError::AlreadyAssigned { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = match &self.0 {
            AppError::Store(_) | AppError::Internal(_) => {
                error!(error = %self.0, "request failed");
                ErrorResponse::new("internal server error".to_owned(), None)
            }
            AppError::RoleInUse { user_count, .. } => {
                ErrorResponse::new(self.0.to_string(), Some(*user_count))
            }
            _ => ErrorResponse::new(self.0.to_string(), None),
        };

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use warden_core::{AppError, UserId};

    use super::ApiError;

    #[test]
    fn errors_map_to_http_statuses() {
        let cases = [
            (AppError::Validation("bad".to_owned()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".to_owned()), StatusCode::NOT_FOUND),
            (
                AppError::RoleInUse {
                    role_name: "editor".to_owned(),
                    user_count: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                AppError::AlreadyAssigned {
                    user_id: UserId::new(),
                    role_name: "editor".to_owned(),
                },
                StatusCode::CONFLICT,
            ),
            (AppError::Unauthorized("who".to_owned()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("no".to_owned()), StatusCode::FORBIDDEN),
            (
                AppError::Store("connection reset".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError(error).into_response().status(), status);
        }
    }
}
