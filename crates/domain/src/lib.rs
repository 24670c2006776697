//! Domain entities and invariants for the RBAC permission engine.

#![forbid(unsafe_code)]

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: uuid::Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = warden_core::AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    warden_core::AppError::Validation(format!(
                        concat!("invalid ", $label, " '{}': {}"),
                        value, error
                    ))
                })
            }
        }
    };
}

mod assignment;
mod audit;
mod module;
mod permission;
mod permission_map;
mod role;

pub use assignment::{PermissionGrant, UserRoleAssignment};
pub use audit::{AdminPermission, AuditAction, USER_MANAGEMENT_MODULE};
pub use module::{Module, ModuleId};
pub use permission::{
    ModulePermissionGroup, PermissionDefinition, PermissionDiff, PermissionId,
    group_permissions_by_module,
};
pub use permission_map::PermissionMap;
pub use role::{
    NewRole, ROLE_NAME_MAX_LENGTH, Role, RoleChanges, RoleId, RoleSort, RoleUpdate,
    SUPER_ADMIN_ROLE_NAME, SortDirection,
};
