mod activity;
mod common;
mod permissions;
mod roles;
mod users;

pub use activity::{ActivityLogEntryResponse, DashboardStatsResponse};
pub use common::{HealthDependencyStatus, HealthResponse};
pub use permissions::{
    CheckPermissionRequest, ModulePermissionGroupResponse, PermissionCheckResponse,
    PermissionMapResponse, PermissionResponse, RolePermissionsUpdateResponse,
    UpdateRolePermissionsRequest,
};
pub use roles::{
    CreateRoleRequest, DuplicateRoleRequest, RoleDetailResponse, RoleDuplicationResponse,
    RolePageResponse, RoleResponse, UpdateRoleRequest,
};
pub use users::{AssignRoleRequest, UserRoleResponse};

#[cfg(test)]
mod tests {
    use super::{
        ActivityLogEntryResponse, AssignRoleRequest, CheckPermissionRequest, CreateRoleRequest,
        DashboardStatsResponse, DuplicateRoleRequest, HealthDependencyStatus, HealthResponse,
        ModulePermissionGroupResponse, PermissionCheckResponse, PermissionMapResponse,
        PermissionResponse, RoleDetailResponse, RoleDuplicationResponse, RolePageResponse,
        RolePermissionsUpdateResponse, RoleResponse, UpdateRolePermissionsRequest,
        UpdateRoleRequest, UserRoleResponse,
    };

    use crate::error::types::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        CreateRoleRequest::export(&config)?;
        UpdateRoleRequest::export(&config)?;
        DuplicateRoleRequest::export(&config)?;
        UpdateRolePermissionsRequest::export(&config)?;
        CheckPermissionRequest::export(&config)?;
        AssignRoleRequest::export(&config)?;
        RoleResponse::export(&config)?;
        super::roles::RoleSummaryResponse::export(&config)?;
        RolePageResponse::export(&config)?;
        RoleDetailResponse::export(&config)?;
        RoleDuplicationResponse::export(&config)?;
        PermissionResponse::export(&config)?;
        ModulePermissionGroupResponse::export(&config)?;
        RolePermissionsUpdateResponse::export(&config)?;
        PermissionMapResponse::export(&config)?;
        PermissionCheckResponse::export(&config)?;
        super::common::CompletionResponse::export(&config)?;
        UserRoleResponse::export(&config)?;
        ActivityLogEntryResponse::export(&config)?;
        DashboardStatsResponse::export(&config)?;
        HealthResponse::export(&config)?;
        HealthDependencyStatus::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }
}
