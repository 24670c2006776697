use serde::{Deserialize, Serialize};
use warden_domain::{ModuleId, PermissionDefinition, Role, RoleSort, SortDirection};

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 200;
const MAX_OFFSET: usize = 10_000;

/// Filter, sort and page parameters for role listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleListQuery {
    /// Case-insensitive match on name or display name.
    pub search: Option<String>,
    /// Restricts results to one module scope.
    pub module_id: Option<ModuleId>,
    /// Whether system roles are included.
    pub include_system: bool,
    /// Sort column.
    pub sort: RoleSort,
    /// Sort direction.
    pub direction: SortDirection,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl Default for RoleListQuery {
    fn default() -> Self {
        Self {
            search: None,
            module_id: None,
            include_system: true,
            sort: RoleSort::default(),
            direction: SortDirection::default(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl RoleListQuery {
    /// Clamps paging bounds and drops blank search terms.
    #[must_use]
    pub fn normalized(self) -> Self {
        let search = self.search.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        Self {
            search,
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.min(MAX_OFFSET),
            ..self
        }
    }

    /// Returns a stable cache key for this query.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "roles:list:search={}:module={}:system={}:sort={}:{}:limit={}:offset={}",
            self.search.as_deref().unwrap_or_default(),
            self.module_id
                .map(|module_id| module_id.to_string())
                .unwrap_or_else(|| "any".to_owned()),
            self.include_system,
            self.sort.as_str(),
            self.direction.as_str(),
            self.limit,
            self.offset
        )
    }
}

/// Role list row with aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    /// Role record.
    pub role: Role,
    /// Number of permissions granted by the role.
    pub permission_count: u64,
    /// Number of users holding the role.
    pub user_count: u64,
}

/// One page of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePage {
    /// Roles on this page.
    pub roles: Vec<RoleSummary>,
    /// Total number of roles matching the filter.
    pub total: u64,
}

/// Role with its nested permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDetail {
    /// Role record.
    pub role: Role,
    /// Granted permissions.
    pub permissions: Vec<PermissionDefinition>,
}

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Machine-readable role name, unique per module scope.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Module scope; `None` creates a global role.
    pub module_id: Option<ModuleId>,
    /// Display priority, defaults to zero.
    pub priority: Option<i32>,
}

#[cfg(test)]
mod tests {
    use warden_domain::{RoleSort, SortDirection};

    use super::RoleListQuery;

    #[test]
    fn normalized_query_clamps_paging_and_blank_search() {
        let query = RoleListQuery {
            search: Some("   ".to_owned()),
            limit: 5_000,
            offset: 50_000,
            ..RoleListQuery::default()
        }
        .normalized();

        assert_eq!(query.search, None);
        assert_eq!(query.limit, 200);
        assert_eq!(query.offset, 10_000);
    }

    #[test]
    fn cache_key_distinguishes_sort_direction() {
        let ascending = RoleListQuery {
            sort: RoleSort::Name,
            direction: SortDirection::Asc,
            ..RoleListQuery::default()
        };
        let descending = RoleListQuery {
            direction: SortDirection::Desc,
            ..ascending.clone()
        };

        assert_ne!(ascending.cache_key(), descending.cache_key());
    }
}
