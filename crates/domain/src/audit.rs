use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::AppError;

/// Module that owns the administrative RBAC capabilities.
pub const USER_MANAGEMENT_MODULE: &str = "user_management";

/// Capabilities required to operate the administrative console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    /// Allows reading roles and their permissions.
    RolesRead,
    /// Allows creating and duplicating roles.
    RolesCreate,
    /// Allows updating roles and their permission sets.
    RolesUpdate,
    /// Allows deleting roles.
    RolesDelete,
    /// Allows reading other users' roles and permissions.
    UsersRead,
    /// Allows assigning and removing user roles.
    UsersAssignRoles,
    /// Allows reading the activity log.
    ActivityRead,
}

impl AdminPermission {
    /// Returns the owning module name.
    #[must_use]
    pub fn module(&self) -> &'static str {
        USER_MANAGEMENT_MODULE
    }

    /// Returns the resource part of the capability.
    #[must_use]
    pub fn resource(&self) -> &'static str {
        match self {
            Self::RolesRead | Self::RolesCreate | Self::RolesUpdate | Self::RolesDelete => "roles",
            Self::UsersRead | Self::UsersAssignRoles => "users",
            Self::ActivityRead => "activity_log",
        }
    }

    /// Returns the action part of the capability.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::RolesRead | Self::UsersRead | Self::ActivityRead => "read",
            Self::RolesCreate => "create",
            Self::RolesUpdate => "update",
            Self::RolesDelete => "delete",
            Self::UsersAssignRoles => "assign_roles",
        }
    }

    /// Returns the dotted storage value for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RolesRead => "user_management.roles.read",
            Self::RolesCreate => "user_management.roles.create",
            Self::RolesUpdate => "user_management.roles.update",
            Self::RolesDelete => "user_management.roles.delete",
            Self::UsersRead => "user_management.users.read",
            Self::UsersAssignRoles => "user_management.users.assign_roles",
            Self::ActivityRead => "user_management.activity_log.read",
        }
    }

    /// Returns all known administrative capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AdminPermission] = &[
            AdminPermission::RolesRead,
            AdminPermission::RolesCreate,
            AdminPermission::RolesUpdate,
            AdminPermission::RolesDelete,
            AdminPermission::UsersRead,
            AdminPermission::UsersAssignRoles,
            AdminPermission::ActivityRead,
        ];

        ALL
    }
}

impl FromStr for AdminPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!("unknown administrative permission '{value}'"))
            })
    }
}

/// Stable activity actions emitted by RBAC mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role's mutable fields change.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a role is duplicated.
    RoleDuplicated,
    /// Emitted when a role's permission set is replaced.
    RolePermissionsUpdated,
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role is removed from a user.
    RoleRemoved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "role_created",
            Self::RoleUpdated => "role_updated",
            Self::RoleDeleted => "role_deleted",
            Self::RoleDuplicated => "role_duplicated",
            Self::RolePermissionsUpdated => "role_permissions_updated",
            Self::RoleAssigned => "role_assigned",
            Self::RoleRemoved => "role_removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::AdminPermission;

    #[test]
    fn admin_permission_roundtrip_storage_value() {
        for permission in AdminPermission::all() {
            let restored = AdminPermission::from_str(permission.as_str());
            assert_eq!(restored.ok(), Some(*permission));
            assert_eq!(
                permission.as_str(),
                format!(
                    "{}.{}.{}",
                    permission.module(),
                    permission.resource(),
                    permission.action()
                )
            );
        }
    }

    #[test]
    fn unknown_admin_permission_is_rejected() {
        assert!(AdminPermission::from_str("user_management.roles.unknown").is_err());
    }
}
