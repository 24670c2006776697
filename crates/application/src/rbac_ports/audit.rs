use chrono::{DateTime, Utc};
use serde_json::Value;
use warden_core::UserId;
use warden_domain::AuditAction;

/// Audit event payload emitted by RBAC mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Actor that performed the action, if known.
    pub actor: Option<UserId>,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Module the action belongs to.
    pub module: String,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: Option<String>,
    /// Structured change payload.
    pub changes: Option<Value>,
}

/// Audit log entry projection for administrative views.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    /// Stable entry identifier.
    pub id: String,
    /// Actor that performed the action.
    pub user_id: Option<UserId>,
    /// Stable action identifier.
    pub action: String,
    /// Module the action belongs to.
    pub module: String,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: Option<String>,
    /// Structured change payload.
    pub changes: Option<Value>,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional action filter.
    pub action: Option<String>,
    /// Optional actor filter.
    pub user_id: Option<UserId>,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            action: None,
            user_id: None,
        }
    }
}
