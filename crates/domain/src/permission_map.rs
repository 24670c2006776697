use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PermissionGrant;

/// Resolved per-user capabilities: `module -> resource -> actions`.
///
/// A missing module key means no access to that module. Grants are a union; nothing in the map
/// can deny a capability contributed by another role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<String, BTreeMap<String, BTreeSet<String>>>);

impl PermissionMap {
    /// Creates an empty map that denies everything.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a map from the grants that are still active at `now`.
    #[must_use]
    pub fn from_grants<'a>(
        grants: impl IntoIterator<Item = &'a PermissionGrant>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut map = Self::empty();
        for grant in grants
            .into_iter()
            .filter(|grant| grant.is_active_at(now))
        {
            map.insert(
                grant.module_name.as_str(),
                grant.resource.as_str(),
                grant.action.as_str(),
            );
        }

        map
    }

    /// Adds one capability, ignoring duplicates.
    pub fn insert(&mut self, module: &str, resource: &str, action: &str) {
        self.0
            .entry(module.to_owned())
            .or_default()
            .entry(resource.to_owned())
            .or_default()
            .insert(action.to_owned());
    }

    /// Returns whether the map grants `action` on `resource` in `module`.
    #[must_use]
    pub fn has_permission(&self, module: &str, resource: &str, action: &str) -> bool {
        self.0
            .get(module)
            .and_then(|resources| resources.get(resource))
            .is_some_and(|actions| actions.contains(action))
    }

    /// Returns whether the map grants anything inside `module`.
    #[must_use]
    pub fn can_access_module(&self, module: &str) -> bool {
        self.0.contains_key(module)
    }

    /// Returns the actions granted on one resource.
    #[must_use]
    pub fn actions(&self, module: &str, resource: &str) -> Option<&BTreeSet<String>> {
        self.0
            .get(module)
            .and_then(|resources| resources.get(resource))
    }

    /// Iterates accessible module names in order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of distinct capabilities in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }

    /// Returns whether the map grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the nested representation.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, BTreeMap<String, BTreeSet<String>>> {
        &self.0
    }
}
