use super::*;

use warden_application::{
    AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository, AuthorizationRepository,
    DashboardRepository, DashboardStats, NewUserRole, UserRoleRepository,
};
use warden_domain::PermissionGrant;

#[async_trait]
impl UserRoleRepository for InMemoryRbacStore {
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.state.read().await.users.contains(&user_id))
    }

    async fn register_user(&self, user_id: UserId) -> AppResult<()> {
        self.insert_user(user_id).await;
        Ok(())
    }

    async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let state = self.state.read().await;
        let mut assignments = state
            .user_roles
            .keys()
            .filter(|(assigned_user_id, _)| *assigned_user_id == user_id)
            .filter_map(|(_, role_id)| state.assignment(user_id, *role_id))
            .collect::<Vec<_>>();
        assignments.sort_by(|left, right| right.assigned_at.cmp(&left.assigned_at));
        Ok(assignments)
    }

    async fn find_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Option<UserRoleAssignment>> {
        Ok(self.state.read().await.assignment(user_id, role_id))
    }

    async fn insert_user_role(&self, assignment: &NewUserRole) -> AppResult<UserRoleAssignment> {
        let mut state = self.state.write().await;
        if !state.users.contains(&assignment.user_id) {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                assignment.user_id
            )));
        }
        let Some(role_name) = state
            .roles
            .get(&assignment.role_id)
            .map(|role| role.name.clone())
        else {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                assignment.role_id
            )));
        };

        let key = (assignment.user_id, assignment.role_id);
        if state.user_roles.contains_key(&key) {
            return Err(AppError::AlreadyAssigned {
                user_id: assignment.user_id,
                role_name,
            });
        }

        state.user_roles.insert(
            key,
            StoredAssignment {
                assigned_by: Some(assignment.assigned_by),
                assigned_at: Utc::now(),
                expires_at: assignment.expires_at,
                metadata: assignment.metadata.clone(),
            },
        );

        state
            .assignment(assignment.user_id, assignment.role_id)
            .ok_or_else(|| AppError::Internal("assignment vanished after insert".to_owned()))
    }

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .user_roles
            .remove(&(user_id, role_id))
            .is_some())
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryRbacStore {
    async fn list_permission_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let state = self.state.read().await;
        let mut grants = Vec::new();

        for ((_, role_id), assignment) in state
            .user_roles
            .iter()
            .filter(|((assigned_user_id, _), _)| *assigned_user_id == user_id)
        {
            for (_, permission_id) in state
                .role_permissions
                .iter()
                .filter(|(edge_role_id, _)| edge_role_id == role_id)
            {
                let Some(permission) = state.permissions.get(permission_id) else {
                    continue;
                };
                let Some(module) = state
                    .modules
                    .get(&permission.module_id)
                    .filter(|module| module.is_active)
                else {
                    continue;
                };

                grants.push(PermissionGrant {
                    module_name: module.name.clone(),
                    resource: permission.resource.clone(),
                    action: permission.action.clone(),
                    expires_at: assignment.expires_at,
                });
            }
        }

        Ok(grants)
    }
}

#[async_trait]
impl AuditRepository for InMemoryRbacStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.activity.push(StoredActivity {
            id: uuid::Uuid::new_v4(),
            event,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryRbacStore {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let state = self.state.read().await;
        Ok(state
            .activity
            .iter()
            .rev()
            .filter(|entry| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| entry.event.action.as_str() == action)
            })
            .filter(|entry| {
                query
                    .user_id
                    .is_none_or(|user_id| entry.event.actor == Some(user_id))
            })
            .skip(query.offset)
            .take(query.limit)
            .map(|entry| AuditLogEntry {
                id: entry.id.to_string(),
                user_id: entry.event.actor,
                action: entry.event.action.as_str().to_owned(),
                module: entry.event.module.clone(),
                resource_type: entry.event.resource_type.clone(),
                resource_id: entry.event.resource_id.clone(),
                changes: entry.event.changes.clone(),
                created_at: entry.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl DashboardRepository for InMemoryRbacStore {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let state = self.state.read().await;
        let now = Utc::now();

        Ok(DashboardStats {
            total_users: count(state.users.len()),
            total_roles: count(state.roles.len()),
            system_roles: count(state.roles.values().filter(|role| role.is_system).count()),
            total_permissions: count(state.permissions.len()),
            active_modules: count(
                state
                    .modules
                    .values()
                    .filter(|module| module.is_active)
                    .count(),
            ),
            active_assignments: count(
                state
                    .user_roles
                    .values()
                    .filter(|assignment| {
                        assignment
                            .expires_at
                            .is_none_or(|expires_at| expires_at > now)
                    })
                    .count(),
            ),
        })
    }
}
