use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_application::{RoleDetail, RoleDuplication, RolePage, RoleSummary};
use warden_domain::Role;

use super::common::CompletionResponse;
use super::permissions::PermissionResponse;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub module_id: Option<String>,
    pub priority: Option<i32>,
}

/// Incoming payload for role updates; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
}

/// Incoming payload for role duplication.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/duplicate-role-request.ts"
)]
pub struct DuplicateRoleRequest {
    pub new_name: String,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub module_id: Option<String>,
    pub is_system: bool,
    pub priority: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// Role list row with aggregate counts.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-summary-response.ts"
)]
pub struct RoleSummaryResponse {
    pub role: RoleResponse,
    #[ts(type = "number")]
    pub permission_count: u64,
    #[ts(type = "number")]
    pub user_count: u64,
}

/// One page of roles.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-page-response.ts"
)]
pub struct RolePageResponse {
    pub roles: Vec<RoleSummaryResponse>,
    #[ts(type = "number")]
    pub total: u64,
}

/// Role together with the permissions it grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-detail-response.ts"
)]
pub struct RoleDetailResponse {
    pub role: RoleResponse,
    pub permissions: Vec<PermissionResponse>,
}

/// Result of duplicating a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-duplication-response.ts"
)]
pub struct RoleDuplicationResponse {
    pub role: RoleResponse,
    pub copied_permissions: usize,
    pub completion: CompletionResponse,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id.to_string(),
            name: value.name,
            display_name: value.display_name,
            description: value.description,
            module_id: value.module_id.map(|module_id| module_id.to_string()),
            is_system: value.is_system,
            priority: value.priority,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

impl From<RoleSummary> for RoleSummaryResponse {
    fn from(value: RoleSummary) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            permission_count: value.permission_count,
            user_count: value.user_count,
        }
    }
}

impl From<RolePage> for RolePageResponse {
    fn from(value: RolePage) -> Self {
        Self {
            roles: value
                .roles
                .into_iter()
                .map(RoleSummaryResponse::from)
                .collect(),
            total: value.total,
        }
    }
}

impl From<RoleDetail> for RoleDetailResponse {
    fn from(value: RoleDetail) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}

impl From<RoleDuplication> for RoleDuplicationResponse {
    fn from(value: RoleDuplication) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            copied_permissions: value.copied_permissions,
            completion: CompletionResponse::from(value.completion),
        }
    }
}
