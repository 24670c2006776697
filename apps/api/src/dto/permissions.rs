use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_application::RolePermissionsUpdate;
use warden_domain::{ModulePermissionGroup, PermissionDefinition, PermissionMap};

use super::common::CompletionResponse;

/// API representation of one permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub module_id: String,
    pub module_name: String,
    pub resource: String,
    pub action: String,
    pub key: String,
    pub description: Option<String>,
}

/// Permissions of one module.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/module-permission-group-response.ts"
)]
pub struct ModulePermissionGroupResponse {
    pub module_id: String,
    pub module_name: String,
    pub display_name: String,
    pub permissions: Vec<PermissionResponse>,
}

/// Incoming payload replacing a role's permission set.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-permissions-request.ts"
)]
pub struct UpdateRolePermissionsRequest {
    pub permission_ids: Vec<String>,
}

/// Result of replacing a role's permission set.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-permissions-update-response.ts"
)]
pub struct RolePermissionsUpdateResponse {
    pub added: usize,
    pub removed: usize,
    pub total: usize,
    pub completion: CompletionResponse,
}

/// Resolved `module -> resource -> actions` map.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-map-response.ts"
)]
pub struct PermissionMapResponse {
    pub user_id: String,
    pub permissions: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// Incoming payload for a single permission check.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-permission-request.ts"
)]
pub struct CheckPermissionRequest {
    pub module: String,
    pub resource: String,
    pub action: String,
    pub user_id: Option<String>,
}

/// Answer to a permission or module access check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            key: value.key(),
            permission_id: value.id.to_string(),
            module_id: value.module_id.to_string(),
            module_name: value.module_name,
            resource: value.resource,
            action: value.action,
            description: value.description,
        }
    }
}

impl From<ModulePermissionGroup> for ModulePermissionGroupResponse {
    fn from(value: ModulePermissionGroup) -> Self {
        Self {
            module_id: value.module_id.to_string(),
            module_name: value.module_name,
            display_name: value.display_name,
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}

impl From<RolePermissionsUpdate> for RolePermissionsUpdateResponse {
    fn from(value: RolePermissionsUpdate) -> Self {
        Self {
            added: value.added,
            removed: value.removed,
            total: value.total,
            completion: CompletionResponse::from(value.completion),
        }
    }
}

impl PermissionMapResponse {
    pub fn new(user_id: warden_core::UserId, map: &PermissionMap) -> Self {
        Self {
            user_id: user_id.to_string(),
            permissions: map
                .as_map()
                .iter()
                .map(|(module, resources)| {
                    (
                        module.clone(),
                        resources
                            .iter()
                            .map(|(resource, actions)| {
                                (resource.clone(), actions.iter().cloned().collect())
                            })
                            .collect(),
                    )
                })
                .collect(),
        }
    }
}
