use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::ModuleId;

uuid_identifier!(
    /// Unique identifier for a role.
    RoleId,
    "role id"
);

/// Name of the distinguished role that must always keep at least one permission.
pub const SUPER_ADMIN_ROLE_NAME: &str = "super_admin";

/// Maximum accepted length for role names.
pub const ROLE_NAME_MAX_LENGTH: usize = 100;

const DUPLICATE_DISPLAY_NAME_SUFFIX: &str = " (Copy)";

/// Named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role id.
    pub id: RoleId,
    /// Machine-readable name, unique per module scope.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Module scope; `None` marks a global role.
    pub module_id: Option<ModuleId>,
    /// System roles can never be updated or deleted.
    pub is_system: bool,
    /// Display and tie-break order.
    pub priority: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Returns whether this is the distinguished super admin role.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.name == SUPER_ADMIN_ROLE_NAME
    }

    /// Rejects mutation of system-protected roles.
    pub fn ensure_mutable(&self) -> AppResult<()> {
        if self.is_system {
            return Err(AppError::Forbidden(format!(
                "role '{}' is a system role and cannot be modified",
                self.name
            )));
        }

        Ok(())
    }

    /// Returns the currently mutable fields of the role.
    #[must_use]
    pub fn mutable_fields(&self) -> RoleChanges {
        RoleChanges {
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            priority: self.priority,
        }
    }

    /// Returns a JSON snapshot suitable for audit payloads.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "display_name": self.display_name,
            "description": self.description,
            "module_id": self.module_id,
            "is_system": self.is_system,
            "priority": self.priority,
        })
    }
}

/// Validated input for inserting a new non-system role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    name: NonEmptyString,
    display_name: NonEmptyString,
    description: Option<String>,
    module_id: Option<ModuleId>,
    priority: i32,
}

impl NewRole {
    /// Creates a validated role draft.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: Option<String>,
        module_id: Option<ModuleId>,
        priority: i32,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if name.as_str().chars().count() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if name.as_str().chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "role name '{}' must not contain whitespace",
                name.as_str()
            )));
        }

        Ok(Self {
            name,
            display_name: NonEmptyString::new(display_name)?,
            description: normalize_description(description),
            module_id,
            priority,
        })
    }

    /// Creates a draft copying everything but the name from an existing role.
    pub fn duplicate_of(source: &Role, new_name: impl Into<String>) -> AppResult<Self> {
        Self::new(
            new_name,
            format!("{}{DUPLICATE_DISPLAY_NAME_SUFFIX}", source.display_name),
            source.description.clone(),
            source.module_id,
            source.priority,
        )
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the module scope.
    #[must_use]
    pub fn module_id(&self) -> Option<ModuleId> {
        self.module_id
    }

    /// Returns the role priority.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Partial update of the mutable role fields.
///
/// `description: Some("")` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdate {
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<i32>,
}

impl RoleUpdate {
    /// Applies the update on top of a role's current mutable fields.
    pub fn apply_to(&self, role: &Role) -> AppResult<RoleChanges> {
        let mut changes = role.mutable_fields();

        if let Some(display_name) = &self.display_name {
            changes.display_name = NonEmptyString::new(display_name.as_str())?.into();
        }
        if let Some(description) = &self.description {
            changes.description = normalize_description(Some(description.clone()));
        }
        if let Some(priority) = self.priority {
            changes.priority = priority;
        }

        Ok(changes)
    }
}

/// Full set of mutable role fields written on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChanges {
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: Option<String>,
    /// Priority.
    pub priority: i32,
}

impl RoleChanges {
    /// Returns a `{before, after}` payload containing only changed fields.
    #[must_use]
    pub fn diff_from(&self, before: &RoleChanges) -> Value {
        let mut old_values = Map::new();
        let mut new_values = Map::new();

        if self.display_name != before.display_name {
            old_values.insert("display_name".to_owned(), json!(before.display_name));
            new_values.insert("display_name".to_owned(), json!(self.display_name));
        }
        if self.description != before.description {
            old_values.insert("description".to_owned(), json!(before.description));
            new_values.insert("description".to_owned(), json!(self.description));
        }
        if self.priority != before.priority {
            old_values.insert("priority".to_owned(), json!(before.priority));
            new_values.insert("priority".to_owned(), json!(self.priority));
        }

        json!({ "before": old_values, "after": new_values })
    }
}

/// Sortable role list columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSort {
    /// Sort by machine name.
    Name,
    /// Sort by display name.
    DisplayName,
    /// Sort by priority.
    #[default]
    Priority,
    /// Sort by creation time.
    CreatedAt,
}

impl RoleSort {
    /// Returns stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DisplayName => "display_name",
            Self::Priority => "priority",
            Self::CreatedAt => "created_at",
        }
    }
}

impl FromStr for RoleSort {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "display_name" => Ok(Self::DisplayName),
            "priority" => Ok(Self::Priority),
            "created_at" => Ok(Self::CreatedAt),
            _ => Err(AppError::Validation(format!("unknown role sort '{value}'"))),
        }
    }
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortDirection {
    /// Returns stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::Validation(format!(
                "unknown sort direction '{value}'"
            ))),
        }
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{NewRole, Role, RoleId, RoleUpdate, SUPER_ADMIN_ROLE_NAME};

    fn role(name: &str, is_system: bool) -> Role {
        Role {
            id: RoleId::new(),
            name: name.to_owned(),
            display_name: "Editor".to_owned(),
            description: Some("Edits content".to_owned()),
            module_id: None,
            is_system,
            priority: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_role_rejects_whitespace_in_name() {
        assert!(NewRole::new("content editor", "Editor", None, None, 0).is_err());
    }

    #[test]
    fn new_role_drops_blank_description() {
        let draft = NewRole::new("editor", "Editor", Some("  ".to_owned()), None, 0);
        assert!(draft.is_ok());
        assert_eq!(draft.ok().and_then(|value| value.description().map(str::to_owned)), None);
    }

    #[test]
    fn duplicate_draft_appends_copy_suffix() {
        let source = role("editor", true);
        let draft = NewRole::duplicate_of(&source, "editor-copy");
        assert!(draft.is_ok());
        let draft = draft.unwrap_or_else(|_| unreachable!());
        assert_eq!(draft.name(), "editor-copy");
        assert_eq!(draft.display_name(), "Editor (Copy)");
        assert_eq!(draft.priority(), 10);
        assert_eq!(draft.description(), Some("Edits content"));
    }

    #[test]
    fn system_roles_are_not_mutable() {
        assert!(role("owner", true).ensure_mutable().is_err());
        assert!(role("editor", false).ensure_mutable().is_ok());
    }

    #[test]
    fn super_admin_is_detected_by_name() {
        assert!(role(SUPER_ADMIN_ROLE_NAME, true).is_super_admin());
        assert!(!role("admin", true).is_super_admin());
    }

    #[test]
    fn update_diff_contains_only_changed_fields() {
        let current = role("editor", false);
        let update = RoleUpdate {
            display_name: None,
            description: Some(String::new()),
            priority: Some(20),
        };

        let changes = update.apply_to(&current);
        assert!(changes.is_ok());
        let changes = changes.unwrap_or_else(|_| unreachable!());
        assert_eq!(changes.description, None);

        let diff = changes.diff_from(&current.mutable_fields());
        assert_eq!(diff["before"]["priority"], 10);
        assert_eq!(diff["after"]["priority"], 20);
        assert!(diff["after"].get("display_name").is_none());
    }

    #[test]
    fn update_rejects_blank_display_name() {
        let update = RoleUpdate {
            display_name: Some(" ".to_owned()),
            ..RoleUpdate::default()
        };
        assert!(update.apply_to(&role("editor", false)).is_err());
    }
}
