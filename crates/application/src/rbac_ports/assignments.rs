use chrono::{DateTime, Utc};
use serde_json::Value;
use warden_core::UserId;
use warden_domain::RoleId;

/// Input payload for assigning a role to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignRoleInput {
    /// User receiving the role.
    pub user_id: UserId,
    /// Role being assigned.
    pub role_id: RoleId,
    /// Optional point after which the assignment stops granting permissions.
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional metadata stored with the assignment.
    pub metadata: Option<Value>,
}

/// Assignment row written by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserRole {
    /// User receiving the role.
    pub user_id: UserId,
    /// Role being assigned.
    pub role_id: RoleId,
    /// Actor creating the assignment.
    pub assigned_by: UserId,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional metadata.
    pub metadata: Option<Value>,
}
