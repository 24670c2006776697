use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    user_count: Option<u64>,
}

impl ErrorResponse {
    pub(super) fn new(message: String, user_count: Option<u64>) -> Self {
        Self {
            message,
            user_count,
        }
    }
}
