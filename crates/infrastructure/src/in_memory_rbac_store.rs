use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use warden_application::{
    AuditEvent, PermissionRepository, RoleListQuery, RolePage, RoleRepository, RoleSummary,
};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    AdminPermission, Module, ModuleId, NewRole, PermissionDefinition, PermissionId, Role,
    RoleChanges, RoleId, RoleSort, SUPER_ADMIN_ROLE_NAME, SortDirection, USER_MANAGEMENT_MODULE,
    UserRoleAssignment,
};

mod assignments;


#[derive(Debug, Clone)]
struct StoredPermission {
    id: PermissionId,
    module_id: ModuleId,
    resource: String,
    action: String,
    description: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredAssignment {
    assigned_by: Option<UserId>,
    assigned_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    metadata: Option<Value>,
}

#[derive(Debug, Clone)]
struct StoredActivity {
    id: uuid::Uuid,
    event: AuditEvent,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeSet<UserId>,
    modules: BTreeMap<ModuleId, Module>,
    permissions: BTreeMap<PermissionId, StoredPermission>,
    roles: BTreeMap<RoleId, Role>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: BTreeMap<(UserId, RoleId), StoredAssignment>,
    activity: Vec<StoredActivity>,
}

impl StoreState {
    fn permission_definition(&self, permission: &StoredPermission) -> Option<PermissionDefinition> {
        let module = self.modules.get(&permission.module_id)?;
        Some(PermissionDefinition {
            id: permission.id,
            module_id: module.id,
            module_name: module.name.clone(),
            module_display_name: module.display_name.clone(),
            resource: permission.resource.clone(),
            action: permission.action.clone(),
            description: permission.description.clone(),
        })
    }

    fn assignment(&self, user_id: UserId, role_id: RoleId) -> Option<UserRoleAssignment> {
        let stored = self.user_roles.get(&(user_id, role_id))?;
        let role = self.roles.get(&role_id)?;
        Some(UserRoleAssignment {
            user_id,
            role_id,
            role_name: role.name.clone(),
            role_display_name: role.display_name.clone(),
            module_id: role.module_id,
            assigned_by: stored.assigned_by,
            assigned_at: stored.assigned_at,
            expires_at: stored.expires_at,
            metadata: stored.metadata.clone(),
        })
    }

    fn role_permission_count(&self, role_id: RoleId) -> u64 {
        count(
            self.role_permissions
                .iter()
                .filter(|(edge_role_id, _)| *edge_role_id == role_id)
                .count(),
        )
    }

    fn role_user_count(&self, role_id: RoleId) -> u64 {
        count(
            self.user_roles
                .keys()
                .filter(|(_, assigned_role_id)| *assigned_role_id == role_id)
                .count(),
        )
    }
}

/// In-memory store implementing every RBAC repository port.
///
/// Mirrors the PostgreSQL schema constraints: `(name, module_id)` uniqueness, cascading
/// permission edges and restricted deletion of assigned roles.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    state: RwLock<StoreState>,
}

impl InMemoryRbacStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user mirrored from the identity provider.
    pub async fn insert_user(&self, user_id: UserId) {
        self.state.write().await.users.insert(user_id);
    }

    /// Registers a module.
    pub async fn insert_module(
        &self,
        name: &str,
        display_name: &str,
        is_active: bool,
    ) -> AppResult<Module> {
        let mut state = self.state.write().await;
        if state.modules.values().any(|module| module.name == name) {
            return Err(AppError::Conflict(format!("module '{name}' already exists")));
        }

        let module = Module {
            id: ModuleId::new(),
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            is_active,
        };
        state.modules.insert(module.id, module.clone());
        Ok(module)
    }

    /// Toggles whether a module contributes permissions.
    pub async fn set_module_active(&self, module_id: ModuleId, is_active: bool) -> AppResult<()> {
        let mut state = self.state.write().await;
        let module = state
            .modules
            .get_mut(&module_id)
            .ok_or_else(|| AppError::NotFound(format!("module '{module_id}' does not exist")))?;
        module.is_active = is_active;
        Ok(())
    }

    /// Registers a permission inside a module.
    pub async fn insert_permission(
        &self,
        module_id: ModuleId,
        resource: &str,
        action: &str,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition> {
        let mut state = self.state.write().await;
        if !state.modules.contains_key(&module_id) {
            return Err(AppError::NotFound(format!(
                "module '{module_id}' does not exist"
            )));
        }
        if state.permissions.values().any(|permission| {
            permission.module_id == module_id
                && permission.resource == resource
                && permission.action == action
        }) {
            return Err(AppError::Conflict(format!(
                "permission '{resource}.{action}' already exists in module '{module_id}'"
            )));
        }

        let permission = StoredPermission {
            id: PermissionId::new(),
            module_id,
            resource: resource.to_owned(),
            action: action.to_owned(),
            description: description.map(str::to_owned),
        };
        state.permissions.insert(permission.id, permission.clone());
        state
            .permission_definition(&permission)
            .ok_or_else(|| AppError::Internal("permission module vanished".to_owned()))
    }

    /// Inserts a system role granting the given permissions.
    pub async fn insert_system_role(
        &self,
        name: &str,
        display_name: &str,
        permission_ids: &[PermissionId],
    ) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state
            .roles
            .values()
            .any(|role| role.name == name && role.module_id.is_none())
        {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            description: None,
            module_id: None,
            is_system: true,
            priority: 1000,
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(role.id, role.clone());
        for permission_id in permission_ids {
            state.role_permissions.insert((role.id, *permission_id));
        }

        Ok(role)
    }

    /// Seeds the administrative module, its permissions and the `super_admin` role.
    pub async fn seed_user_management(&self) -> AppResult<Role> {
        let module = self
            .insert_module(USER_MANAGEMENT_MODULE, "User Management", true)
            .await?;

        let mut permission_ids = Vec::with_capacity(AdminPermission::all().len());
        for permission in AdminPermission::all() {
            let created = self
                .insert_permission(module.id, permission.resource(), permission.action(), None)
                .await?;
            permission_ids.push(created.id);
        }

        self.insert_system_role(SUPER_ADMIN_ROLE_NAME, "Super Admin", &permission_ids)
            .await
    }

    /// Returns how many activity entries have been appended.
    pub async fn activity_count(&self) -> usize {
        self.state.read().await.activity.len()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacStore {
    async fn list_roles(&self, query: &RoleListQuery) -> AppResult<RolePage> {
        let state = self.state.read().await;
        let search = query.search.as_deref().map(str::to_lowercase);

        let mut roles = state
            .roles
            .values()
            .filter(|role| query.include_system || !role.is_system)
            .filter(|role| query.module_id.is_none_or(|id| role.module_id == Some(id)))
            .filter(|role| {
                search.as_deref().is_none_or(|search| {
                    role.name.to_lowercase().contains(search)
                        || role.display_name.to_lowercase().contains(search)
                })
            })
            .cloned()
            .collect::<Vec<_>>();

        roles.sort_by(|left, right| {
            let ordering = match query.sort {
                RoleSort::Name => left.name.cmp(&right.name),
                RoleSort::DisplayName => left.display_name.cmp(&right.display_name),
                RoleSort::Priority => left.priority.cmp(&right.priority),
                RoleSort::CreatedAt => left.created_at.cmp(&right.created_at),
            };
            let ordering = match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| left.name.cmp(&right.name))
        });

        let total = count(roles.len());
        let roles = roles
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|role| RoleSummary {
                permission_count: state.role_permission_count(role.id),
                user_count: state.role_user_count(role.id),
                role,
            })
            .collect();

        Ok(RolePage { roles, total })
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_scope(
        &self,
        name: &str,
        module_id: Option<ModuleId>,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .find(|role| role.name == name && role.module_id == module_id)
            .cloned())
    }

    async fn insert_role(&self, role: &NewRole) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state
            .roles
            .values()
            .any(|existing| existing.name == role.name() && existing.module_id == role.module_id())
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists in this scope",
                role.name()
            )));
        }
        if let Some(module_id) = role.module_id()
            && !state.modules.contains_key(&module_id)
        {
            return Err(AppError::NotFound(format!(
                "module '{module_id}' does not exist"
            )));
        }

        let now = Utc::now();
        let created = Role {
            id: RoleId::new(),
            name: role.name().to_owned(),
            display_name: role.display_name().to_owned(),
            description: role.description().map(str::to_owned),
            module_id: role.module_id(),
            is_system: false,
            priority: role.priority(),
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_role(&self, role_id: RoleId, changes: &RoleChanges) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        role.display_name = changes.display_name.clone();
        role.description = changes.description.clone();
        role.priority = changes.priority;
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.role_user_count(role_id) > 0 {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' is still assigned to users"
            )));
        }
        if state.roles.remove(&role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        state
            .role_permissions
            .retain(|(edge_role_id, _)| *edge_role_id != role_id);
        Ok(())
    }

    async fn list_role_permission_ids(&self, role_id: RoleId) -> AppResult<Vec<PermissionId>> {
        Ok(self
            .state
            .read()
            .await
            .role_permissions
            .iter()
            .filter(|(edge_role_id, _)| *edge_role_id == role_id)
            .map(|(_, permission_id)| *permission_id)
            .collect())
    }

    async fn insert_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }
        if let Some(missing) = permission_ids
            .iter()
            .find(|permission_id| !state.permissions.contains_key(permission_id))
        {
            return Err(AppError::NotFound(format!(
                "permission '{missing}' does not exist"
            )));
        }

        for permission_id in permission_ids {
            state.role_permissions.insert((role_id, *permission_id));
        }
        Ok(())
    }

    async fn delete_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        for permission_id in permission_ids {
            state.role_permissions.remove(&(role_id, *permission_id));
        }
        Ok(())
    }

    async fn count_role_users(&self, role_id: RoleId) -> AppResult<u64> {
        Ok(self.state.read().await.role_user_count(role_id))
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacStore {
    async fn list_modules(&self) -> AppResult<Vec<Module>> {
        let mut modules = self
            .state
            .read()
            .await
            .modules
            .values()
            .cloned()
            .collect::<Vec<_>>();
        modules.sort_by(|left, right| {
            left.display_name
                .cmp(&right.display_name)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(modules)
    }

    async fn find_module(&self, module_id: ModuleId) -> AppResult<Option<Module>> {
        Ok(self.state.read().await.modules.get(&module_id).cloned())
    }

    async fn list_permissions(
        &self,
        module_id: Option<ModuleId>,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .permissions
            .values()
            .filter(|permission| module_id.is_none_or(|id| permission.module_id == id))
            .filter(|permission| {
                state
                    .modules
                    .get(&permission.module_id)
                    .is_some_and(|module| module.is_active)
            })
            .filter_map(|permission| state.permission_definition(permission))
            .collect())
    }

    async fn list_role_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .role_permissions
            .iter()
            .filter(|(edge_role_id, _)| *edge_role_id == role_id)
            .filter_map(|(_, permission_id)| state.permissions.get(permission_id))
            .filter_map(|permission| state.permission_definition(permission))
            .collect())
    }

    async fn find_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        Ok(permission_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|permission_id| state.permissions.get(permission_id))
            .filter_map(|permission| state.permission_definition(permission))
            .collect())
    }
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
