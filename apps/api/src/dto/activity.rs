use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;
use warden_application::{AuditLogEntry, DashboardStats};

/// API representation of an activity log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/activity-log-entry-response.ts"
)]
pub struct ActivityLogEntryResponse {
    pub entry_id: String,
    pub user_id: Option<String>,
    pub action: String,
    pub module: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub changes: Option<Value>,
    pub created_at: String,
}

/// Aggregate counts for the administrative dashboard.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/dashboard-stats-response.ts"
)]
pub struct DashboardStatsResponse {
    #[ts(type = "number")]
    pub total_users: u64,
    #[ts(type = "number")]
    pub total_roles: u64,
    #[ts(type = "number")]
    pub system_roles: u64,
    #[ts(type = "number")]
    pub total_permissions: u64,
    #[ts(type = "number")]
    pub active_modules: u64,
    #[ts(type = "number")]
    pub active_assignments: u64,
}

impl From<AuditLogEntry> for ActivityLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            entry_id: value.id,
            user_id: value.user_id.map(|user_id| user_id.to_string()),
            action: value.action,
            module: value.module,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            changes: value.changes,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(value: DashboardStats) -> Self {
        Self {
            total_users: value.total_users,
            total_roles: value.total_roles,
            system_roles: value.system_roles,
            total_permissions: value.total_permissions,
            active_modules: value.active_modules,
            active_assignments: value.active_assignments,
        }
    }
}
