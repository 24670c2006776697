use super::*;

use std::collections::BTreeSet;

use serde_json::json;
use warden_domain::{
    ModulePermissionGroup, PermissionDefinition, PermissionDiff, PermissionId,
    group_permissions_by_module,
};

const AVAILABLE_PERMISSIONS_CACHE_KEY: &str = "permissions:available";

impl RoleAdminService {
    /// Returns the permissions a role grants; an unknown role grants nothing.
    pub async fn get_role_permissions(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.require(actor, AdminPermission::RolesRead).await?;

        self.cache
            .get_or_load(
                &format!("roles:permissions:{role_id}"),
                CacheTag::Roles,
                || async {
                    self.permission_repository
                        .list_role_permissions(role_id)
                        .await
                },
            )
            .await
    }

    /// Returns every permission of active modules grouped by module.
    pub async fn get_available_permissions(
        &self,
        actor: &ActorIdentity,
    ) -> AppResult<Vec<ModulePermissionGroup>> {
        self.require(actor, AdminPermission::RolesRead).await?;

        self.cache
            .get_or_load(AVAILABLE_PERMISSIONS_CACHE_KEY, CacheTag::Roles, || async {
                let permissions = self.permission_repository.list_permissions(None).await?;
                Ok::<_, AppError>(group_permissions_by_module(permissions))
            })
            .await
    }

    /// Replaces a role's permission set with `permission_ids`.
    ///
    /// Removals run before additions. When additions fail after removals committed, the outcome
    /// reports a partial completion; calling again converges because the diff is recomputed.
    pub async fn update_role_permissions(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<RolePermissionsUpdate> {
        self.require(actor, AdminPermission::RolesUpdate).await?;

        let role = self.require_role(role_id).await?;
        let desired = permission_ids.into_iter().collect::<BTreeSet<_>>();

        if role.is_super_admin() && desired.is_empty() {
            return Err(AppError::Conflict(format!(
                "role '{}' must keep at least one permission",
                role.name
            )));
        }

        self.ensure_permissions_exist(&desired).await?;

        let current = self.role_repository.list_role_permission_ids(role_id).await?;
        let current_count = current.len();
        let diff = PermissionDiff::between(current, desired.iter().copied());
        if diff.is_empty() {
            return Ok(RolePermissionsUpdate {
                added: 0,
                removed: 0,
                total: current_count,
                completion: Completion::Complete,
            });
        }

        let to_remove = diff.to_remove.iter().copied().collect::<Vec<_>>();
        let to_add = diff.to_add.iter().copied().collect::<Vec<_>>();

        if !to_remove.is_empty() {
            self.role_repository
                .delete_role_permissions(role_id, &to_remove)
                .await?;
        }

        let (added, completion) = if to_add.is_empty() {
            (0, Completion::Complete)
        } else {
            match self
                .role_repository
                .insert_role_permissions(role_id, &to_add)
                .await
            {
                Ok(()) => (to_add.len(), Completion::Complete),
                Err(error) => {
                    tracing::warn!(
                        role_id = %role_id,
                        removed = to_remove.len(),
                        error = %error,
                        "role permissions partially updated"
                    );
                    (
                        0,
                        Completion::Partial {
                            reason: error.to_string(),
                        },
                    )
                }
            }
        };

        let outcome = RolePermissionsUpdate {
            added,
            removed: to_remove.len(),
            total: current_count - to_remove.len() + added,
            completion,
        };

        self.record(
            actor,
            AuditAction::RolePermissionsUpdated,
            ROLE_RESOURCE_TYPE,
            role_id.to_string(),
            json!({
                "role_name": role.name,
                "added": outcome.added,
                "removed": outcome.removed,
                "total": outcome.total,
                "completion": outcome.completion,
            }),
        )
        .await;
        self.invalidate(&[CacheTag::Roles, CacheTag::UserRoles, CacheTag::All])
            .await;

        Ok(outcome)
    }

    async fn ensure_permissions_exist(&self, desired: &BTreeSet<PermissionId>) -> AppResult<()> {
        if desired.is_empty() {
            return Ok(());
        }

        let ids = desired.iter().copied().collect::<Vec<_>>();
        let known = self
            .permission_repository
            .find_permissions(&ids)
            .await?
            .into_iter()
            .map(|permission| permission.id)
            .collect::<BTreeSet<_>>();

        let missing = desired
            .difference(&known)
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!(
                "permissions do not exist: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}
