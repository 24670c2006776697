use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use warden_domain::UserRoleAssignment;

/// Incoming payload for assigning a role to a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role_id: String,
    /// RFC 3339 timestamp after which the assignment stops granting permissions.
    pub expires_at: Option<String>,
    pub metadata: Option<Value>,
}

/// API representation of a user's role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-role-response.ts"
)]
pub struct UserRoleResponse {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
    pub role_display_name: String,
    pub module_id: Option<String>,
    pub assigned_by: Option<String>,
    pub assigned_at: String,
    pub expires_at: Option<String>,
    pub metadata: Option<Value>,
}

impl From<UserRoleAssignment> for UserRoleResponse {
    fn from(value: UserRoleAssignment) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            role_id: value.role_id.to_string(),
            role_name: value.role_name,
            role_display_name: value.role_display_name,
            module_id: value.module_id.map(|module_id| module_id.to_string()),
            assigned_by: value.assigned_by.map(|user_id| user_id.to_string()),
            assigned_at: value.assigned_at.to_rfc3339(),
            expires_at: value.expires_at.map(|expires_at| expires_at.to_rfc3339()),
            metadata: value.metadata,
        }
    }
}
