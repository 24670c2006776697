use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
    pub redis: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Outcome of a write that runs in two non-atomic phases.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/completion-response.ts"
)]
pub struct CompletionResponse {
    pub status: String,
    pub reason: Option<String>,
}

impl From<warden_application::Completion> for CompletionResponse {
    fn from(value: warden_application::Completion) -> Self {
        match value {
            warden_application::Completion::Complete => Self {
                status: "complete".to_owned(),
                reason: None,
            },
            warden_application::Completion::Partial { reason } => Self {
                status: "partial".to_owned(),
                reason: Some(reason),
            },
        }
    }
}
