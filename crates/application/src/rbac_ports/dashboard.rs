use serde::{Deserialize, Serialize};

/// Aggregate counts shown on the administrative dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Known users.
    pub total_users: u64,
    /// All roles.
    pub total_roles: u64,
    /// System-protected roles.
    pub system_roles: u64,
    /// Permission reference rows.
    pub total_permissions: u64,
    /// Active modules.
    pub active_modules: u64,
    /// Role assignments that have not expired.
    pub active_assignments: u64,
}
