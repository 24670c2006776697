use serde::{Deserialize, Serialize};

uuid_identifier!(
    /// Unique identifier for a feature module.
    ModuleId,
    "module id"
);

/// Top-level feature area that scopes roles and permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Stable module id.
    pub id: ModuleId,
    /// Unique machine-readable name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Inactive modules contribute no permissions.
    pub is_active: bool,
}
