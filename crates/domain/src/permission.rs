use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ModuleId;

uuid_identifier!(
    /// Unique identifier for a permission.
    PermissionId,
    "permission id"
);

/// Atomic `(module, resource, action)` capability with its module labels resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Stable permission id.
    pub id: PermissionId,
    /// Owning module id.
    pub module_id: ModuleId,
    /// Owning module machine name.
    pub module_name: String,
    /// Owning module display name.
    pub module_display_name: String,
    /// Resource the action applies to.
    pub resource: String,
    /// Action allowed on the resource.
    pub action: String,
    /// Optional description.
    pub description: Option<String>,
}

impl PermissionDefinition {
    /// Returns the dotted `module.resource.action` key.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}.{}", self.module_name, self.resource, self.action)
    }
}

/// Permissions of one module, used by permission pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermissionGroup {
    /// Module id.
    pub module_id: ModuleId,
    /// Module machine name.
    pub module_name: String,
    /// Module display name.
    pub display_name: String,
    /// Permissions ordered by resource and action.
    pub permissions: Vec<PermissionDefinition>,
}

/// Groups a flat permission list by module.
///
/// Groups are ordered by module display name, then module name; permissions inside a group are
/// ordered by resource, then action.
#[must_use]
pub fn group_permissions_by_module(
    permissions: Vec<PermissionDefinition>,
) -> Vec<ModulePermissionGroup> {
    let mut by_module: BTreeMap<ModuleId, ModulePermissionGroup> = BTreeMap::new();

    for permission in permissions {
        by_module
            .entry(permission.module_id)
            .or_insert_with(|| ModulePermissionGroup {
                module_id: permission.module_id,
                module_name: permission.module_name.clone(),
                display_name: permission.module_display_name.clone(),
                permissions: Vec::new(),
            })
            .permissions
            .push(permission);
    }

    let mut groups = by_module.into_values().collect::<Vec<_>>();
    for group in &mut groups {
        group.permissions.sort_by(|left, right| {
            left.resource
                .cmp(&right.resource)
                .then_with(|| left.action.cmp(&right.action))
        });
    }
    groups.sort_by(|left, right| {
        left.display_name
            .cmp(&right.display_name)
            .then_with(|| left.module_name.cmp(&right.module_name))
    });

    groups
}

/// Edge changes needed to move a role from its current to its desired permission set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionDiff {
    /// Permissions granted by the desired set but missing today.
    pub to_add: BTreeSet<PermissionId>,
    /// Permissions granted today but absent from the desired set.
    pub to_remove: BTreeSet<PermissionId>,
}

impl PermissionDiff {
    /// Computes `desired - current` and `current - desired`.
    #[must_use]
    pub fn between(
        current: impl IntoIterator<Item = PermissionId>,
        desired: impl IntoIterator<Item = PermissionId>,
    ) -> Self {
        let current = current.into_iter().collect::<BTreeSet<_>>();
        let desired = desired.into_iter().collect::<BTreeSet<_>>();

        Self {
            to_add: desired.difference(&current).copied().collect(),
            to_remove: current.difference(&desired).copied().collect(),
        }
    }

    /// Returns whether the current set already matches the desired set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use uuid::Uuid;

    use super::{PermissionDefinition, PermissionDiff, PermissionId, group_permissions_by_module};
    use crate::ModuleId;

    fn permission(
        module_id: ModuleId,
        module_display_name: &str,
        resource: &str,
        action: &str,
    ) -> PermissionDefinition {
        PermissionDefinition {
            id: PermissionId::new(),
            module_id,
            module_name: module_display_name.to_lowercase().replace(' ', "_"),
            module_display_name: module_display_name.to_owned(),
            resource: resource.to_owned(),
            action: action.to_owned(),
            description: None,
        }
    }

    #[test]
    fn grouping_orders_modules_by_display_name() {
        let users = ModuleId::new();
        let inventory = ModuleId::new();
        let groups = group_permissions_by_module(vec![
            permission(users, "User Management", "roles", "update"),
            permission(inventory, "Inventory", "items", "read"),
            permission(users, "User Management", "roles", "create"),
            permission(users, "User Management", "audit", "read"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].display_name, "Inventory");
        assert_eq!(groups[1].display_name, "User Management");
        let keys = groups[1]
            .permissions
            .iter()
            .map(PermissionDefinition::key)
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                "user_management.audit.read",
                "user_management.roles.create",
                "user_management.roles.update",
            ]
        );
    }

    #[test]
    fn grouping_empty_list_yields_no_groups() {
        assert!(group_permissions_by_module(Vec::new()).is_empty());
    }

    #[test]
    fn diff_of_identical_sets_is_empty() {
        let ids = vec![PermissionId::new(), PermissionId::new()];
        assert!(PermissionDiff::between(ids.clone(), ids).is_empty());
    }

    fn id_from(seed: u8) -> PermissionId {
        PermissionId::from_uuid(Uuid::from_bytes([seed; 16]))
    }

    proptest! {
        #[test]
        fn applying_diff_converges_on_desired_set(
            current in proptest::collection::btree_set(0u8..32, 0..16),
            desired in proptest::collection::btree_set(0u8..32, 0..16),
        ) {
            let current_ids = current.iter().copied().map(id_from).collect::<BTreeSet<_>>();
            let desired_ids = desired.iter().copied().map(id_from).collect::<BTreeSet<_>>();

            let diff = PermissionDiff::between(current_ids.clone(), desired_ids.clone());
            prop_assert!(diff.to_add.is_disjoint(&diff.to_remove));

            let mut applied = current_ids;
            for id in &diff.to_remove {
                applied.remove(id);
            }
            applied.extend(diff.to_add.iter().copied());

            prop_assert_eq!(applied, desired_ids);
        }
    }
}
