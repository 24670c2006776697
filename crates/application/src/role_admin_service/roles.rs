use super::*;

use serde_json::json;
use warden_domain::{NewRole, RoleUpdate};

use crate::rbac_ports::{CreateRoleInput, RoleDetail, RoleListQuery, RolePage};

impl RoleAdminService {
    /// Lists roles with permission and user counts.
    pub async fn list_roles(
        &self,
        actor: &ActorIdentity,
        query: RoleListQuery,
    ) -> AppResult<RolePage> {
        self.require(actor, AdminPermission::RolesRead).await?;

        let query = query.normalized();
        self.cache
            .get_or_load(&query.cache_key(), CacheTag::Roles, || async {
                self.role_repository.list_roles(&query).await
            })
            .await
    }

    /// Returns one role with its granted permissions.
    pub async fn get_role(&self, actor: &ActorIdentity, role_id: RoleId) -> AppResult<RoleDetail> {
        self.require(actor, AdminPermission::RolesRead).await?;

        self.cache
            .get_or_load(&role_detail_cache_key(role_id), CacheTag::Roles, || async {
                let role = self.require_role(role_id).await?;
                let permissions = self
                    .permission_repository
                    .list_role_permissions(role_id)
                    .await?;
                Ok::<_, AppError>(RoleDetail { role, permissions })
            })
            .await
    }

    /// Creates a non-system role.
    pub async fn create_role(
        &self,
        actor: &ActorIdentity,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        self.require(actor, AdminPermission::RolesCreate).await?;

        let draft = NewRole::new(
            input.name,
            input.display_name,
            input.description,
            input.module_id,
            input.priority.unwrap_or_default(),
        )?;

        if let Some(module_id) = draft.module_id()
            && self
                .permission_repository
                .find_module(module_id)
                .await?
                .is_none()
        {
            return Err(AppError::NotFound(format!(
                "module '{module_id}' does not exist"
            )));
        }

        self.ensure_name_available(&draft).await?;

        let role = self.role_repository.insert_role(&draft).await?;

        self.record(
            actor,
            AuditAction::RoleCreated,
            ROLE_RESOURCE_TYPE,
            role.id.to_string(),
            json!({ "after": role.snapshot() }),
        )
        .await;
        self.invalidate(&[CacheTag::Roles, CacheTag::All]).await;

        Ok(role)
    }

    /// Updates the mutable fields of a non-system role.
    ///
    /// An update that changes nothing returns the role untouched, without audit or invalidation.
    pub async fn update_role(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<Role> {
        self.require(actor, AdminPermission::RolesUpdate).await?;

        let role = self.require_role(role_id).await?;
        role.ensure_mutable()?;

        let before = role.mutable_fields();
        let changes = update.apply_to(&role)?;
        if changes == before {
            return Ok(role);
        }

        let updated = self.role_repository.update_role(role_id, &changes).await?;

        self.record(
            actor,
            AuditAction::RoleUpdated,
            ROLE_RESOURCE_TYPE,
            role_id.to_string(),
            changes.diff_from(&before),
        )
        .await;
        self.invalidate(&[CacheTag::Roles]).await;

        Ok(updated)
    }

    /// Deletes a non-system role that no user holds.
    pub async fn delete_role(&self, actor: &ActorIdentity, role_id: RoleId) -> AppResult<()> {
        self.require(actor, AdminPermission::RolesDelete).await?;

        let role = self.require_role(role_id).await?;
        role.ensure_mutable()?;

        let user_count = self.role_repository.count_role_users(role_id).await?;
        if user_count > 0 {
            return Err(AppError::RoleInUse {
                role_name: role.name,
                user_count,
            });
        }

        self.role_repository.delete_role(role_id).await?;

        self.record(
            actor,
            AuditAction::RoleDeleted,
            ROLE_RESOURCE_TYPE,
            role_id.to_string(),
            json!({ "before": role.snapshot() }),
        )
        .await;
        self.invalidate(&[CacheTag::Roles, CacheTag::All]).await;

        Ok(())
    }

    /// Copies a role and its permission edges under a new name.
    ///
    /// The new role is kept even when copying edges fails; the outcome then reports a partial
    /// completion.
    pub async fn duplicate_role(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        new_name: &str,
    ) -> AppResult<RoleDuplication> {
        self.require(actor, AdminPermission::RolesCreate).await?;

        let source = self.require_role(role_id).await?;
        let draft = NewRole::duplicate_of(&source, new_name)?;
        self.ensure_name_available(&draft).await?;

        let permission_ids = self
            .role_repository
            .list_role_permission_ids(source.id)
            .await?;
        let role = self.role_repository.insert_role(&draft).await?;

        let (copied_permissions, completion) = if permission_ids.is_empty() {
            (0, Completion::Complete)
        } else {
            match self
                .role_repository
                .insert_role_permissions(role.id, &permission_ids)
                .await
            {
                Ok(()) => (permission_ids.len(), Completion::Complete),
                Err(error) => {
                    tracing::warn!(
                        source_role_id = %source.id,
                        role_id = %role.id,
                        error = %error,
                        "role duplicated without its permissions"
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

        self.record(
            actor,
            AuditAction::RoleDuplicated,
            ROLE_RESOURCE_TYPE,
            role.id.to_string(),
            json!({
                "source_role_id": source.id,
                "after": role.snapshot(),
                "permissions_copied": copied_permissions,
                "completion": completion,
            }),
        )
        .await;
        self.invalidate(&[CacheTag::Roles, CacheTag::All]).await;

        Ok(RoleDuplication {
            role,
            copied_permissions,
            completion,
        })
    }

    async fn ensure_name_available(&self, draft: &NewRole) -> AppResult<()> {
        if self
            .role_repository
            .find_role_by_scope(draft.name(), draft.module_id())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists in this scope",
                draft.name()
            )));
        }

        Ok(())
    }
}

pub(super) fn role_detail_cache_key(role_id: RoleId) -> String {
    format!("roles:detail:{role_id}")
}
