use super::*;

use chrono::Utc;
use serde_json::json;
use warden_domain::{PermissionMap, SUPER_ADMIN_ROLE_NAME, UserRoleAssignment};

use crate::rbac_ports::{AssignRoleInput, NewUserRole};

impl RoleAdminService {
    /// Assigns a role to a user.
    pub async fn assign_role(
        &self,
        actor: &ActorIdentity,
        input: AssignRoleInput,
    ) -> AppResult<UserRoleAssignment> {
        self.require(actor, AdminPermission::UsersAssignRoles)
            .await?;

        if let Some(expires_at) = input.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::Validation(
                "expires_at must be in the future".to_owned(),
            ));
        }

        let role = self.require_role(input.role_id).await?;
        self.require_user(input.user_id).await?;

        if self
            .user_role_repository
            .find_user_role(input.user_id, role.id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyAssigned {
                user_id: input.user_id,
                role_name: role.name,
            });
        }

        let assignment = self
            .user_role_repository
            .insert_user_role(&NewUserRole {
                user_id: input.user_id,
                role_id: role.id,
                assigned_by: actor.user_id(),
                expires_at: input.expires_at,
                metadata: input.metadata,
            })
            .await?;

        self.record(
            actor,
            AuditAction::RoleAssigned,
            USER_ROLE_RESOURCE_TYPE,
            format!("{}:{}", assignment.user_id, assignment.role_id),
            json!({
                "user_id": assignment.user_id,
                "role_id": assignment.role_id,
                "role_name": assignment.role_name,
                "expires_at": assignment.expires_at,
                "metadata": assignment.metadata,
            }),
        )
        .await;
        self.invalidate(&[CacheTag::Roles, CacheTag::UserRoles, CacheTag::All])
            .await;

        Ok(assignment)
    }

    /// Removes a role from a user.
    pub async fn remove_role(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.require(actor, AdminPermission::UsersAssignRoles)
            .await?;

        let role = self.require_role(role_id).await?;

        if !self
            .user_role_repository
            .delete_user_role(user_id, role_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not have role '{}'",
                role.name
            )));
        }

        self.record(
            actor,
            AuditAction::RoleRemoved,
            USER_ROLE_RESOURCE_TYPE,
            format!("{user_id}:{role_id}"),
            json!({
                "user_id": user_id,
                "role_id": role_id,
                "role_name": role.name,
            }),
        )
        .await;
        self.invalidate(&[CacheTag::Roles, CacheTag::UserRoles, CacheTag::All])
            .await;

        Ok(())
    }

    /// Lists the roles held by a user, expired assignments included.
    pub async fn list_user_roles(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        self.require_self_or(actor, user_id, AdminPermission::UsersRead)
            .await?;
        self.require_user(user_id).await?;

        self.user_role_repository.list_user_roles(user_id).await
    }

    /// Returns another user's resolved permission map.
    pub async fn user_permissions(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
    ) -> AppResult<PermissionMap> {
        self.require_self_or(actor, user_id, AdminPermission::UsersRead)
            .await?;

        Ok(self
            .authorization_service
            .user_permissions(Some(user_id))
            .await)
    }

    /// Checks one capability of another user.
    pub async fn check_user_permission(
        &self,
        actor: &ActorIdentity,
        user_id: UserId,
        module: &str,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        self.require_self_or(actor, user_id, AdminPermission::UsersRead)
            .await?;

        Ok(self
            .authorization_service
            .has_permission(module, resource, action, Some(user_id))
            .await)
    }

    /// Mirrors an authenticated actor into the user store so roles can be assigned to them.
    pub async fn register_actor(&self, actor: &ActorIdentity) -> AppResult<()> {
        self.user_role_repository
            .register_user(actor.user_id())
            .await
    }

    /// Grants the global `super_admin` role to a configured operator.
    ///
    /// Runs without a permission gate and returns `None` when the user already holds the role.
    pub async fn bootstrap_super_admin(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<UserRoleAssignment>> {
        let role = self
            .role_repository
            .find_role_by_scope(SUPER_ADMIN_ROLE_NAME, None)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{SUPER_ADMIN_ROLE_NAME}' is not seeded"))
            })?;

        self.user_role_repository.register_user(user_id).await?;
        if self
            .user_role_repository
            .find_user_role(user_id, role.id)
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let assignment = self
            .user_role_repository
            .insert_user_role(&NewUserRole {
                user_id,
                role_id: role.id,
                assigned_by: user_id,
                expires_at: None,
                metadata: Some(json!({ "source": "bootstrap" })),
            })
            .await?;

        self.record(
            &ActorIdentity::new(user_id),
            AuditAction::RoleAssigned,
            USER_ROLE_RESOURCE_TYPE,
            format!("{}:{}", assignment.user_id, assignment.role_id),
            json!({
                "user_id": assignment.user_id,
                "role_id": assignment.role_id,
                "role_name": assignment.role_name,
                "source": "bootstrap",
            }),
        )
        .await;
        self.invalidate(&[CacheTag::Roles, CacheTag::UserRoles, CacheTag::All])
            .await;

        Ok(Some(assignment))
    }

    async fn require_user(&self, user_id: UserId) -> AppResult<()> {
        if self.user_role_repository.user_exists(user_id).await? {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "user '{user_id}' does not exist"
        )))
    }
}
