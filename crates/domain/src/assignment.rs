use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use warden_core::UserId;

use crate::{ModuleId, RoleId};

/// Role held by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRoleAssignment {
    /// User holding the role.
    pub user_id: UserId,
    /// Assigned role id.
    pub role_id: RoleId,
    /// Assigned role name.
    pub role_name: String,
    /// Assigned role display name.
    pub role_display_name: String,
    /// Module scope of the assigned role.
    pub module_id: Option<ModuleId>,
    /// Actor that created the assignment, if known.
    pub assigned_by: Option<UserId>,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Point after which the assignment stops granting permissions.
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-form metadata captured with the assignment.
    pub metadata: Option<Value>,
}

impl UserRoleAssignment {
    /// Returns whether the assignment grants permissions at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// One effective `(module, resource, action)` grant contributed by a role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Module machine name.
    pub module_name: String,
    /// Resource name.
    pub resource: String,
    /// Action name.
    pub action: String,
    /// Expiry of the contributing assignment.
    pub expires_at: Option<DateTime<Utc>>,
}

impl PermissionGrant {
    /// Returns whether the grant is still in force at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Returns the earliest future expiry among active grants.
    #[must_use]
    pub fn next_expiry<'a>(
        grants: impl IntoIterator<Item = &'a PermissionGrant>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        grants
            .into_iter()
            .filter_map(|grant| grant.expires_at)
            .filter(|expires_at| *expires_at > now)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::PermissionGrant;

    fn grant(expires_in_minutes: Option<i64>) -> PermissionGrant {
        PermissionGrant {
            module_name: "cms".to_owned(),
            resource: "article".to_owned(),
            action: "publish".to_owned(),
            expires_at: expires_in_minutes.map(|minutes| Utc::now() + Duration::minutes(minutes)),
        }
    }

    #[test]
    fn expired_grant_is_inactive() {
        let now = Utc::now();
        assert!(!grant(Some(-1)).is_active_at(now));
        assert!(grant(Some(1)).is_active_at(now));
        assert!(grant(None).is_active_at(now));
    }

    #[test]
    fn next_expiry_ignores_past_and_open_ended_grants() {
        let now = Utc::now();
        let grants = [grant(Some(-5)), grant(None), grant(Some(30)), grant(Some(10))];
        let next = PermissionGrant::next_expiry(&grants, now);
        assert_eq!(next, grants[3].expires_at);
    }
}
