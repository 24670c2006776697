use super::*;

use crate::rbac_ports::{AuditLogEntry, AuditLogQuery, DashboardStats};

const DASHBOARD_STATS_CACHE_KEY: &str = "dashboard:stats";
const MAX_ACTIVITY_PAGE_SIZE: usize = 200;

impl RoleAdminService {
    /// Returns the most recent activity log entries.
    pub async fn list_activity_log(
        &self,
        actor: &ActorIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.require(actor, AdminPermission::ActivityRead).await?;

        let query = AuditLogQuery {
            limit: query.limit.clamp(1, MAX_ACTIVITY_PAGE_SIZE),
            action: query.action.filter(|action| !action.trim().is_empty()),
            ..query
        };

        self.audit_log_repository.list_recent_entries(query).await
    }

    /// Returns aggregate counts for the administrative dashboard.
    pub async fn dashboard_stats(&self, actor: &ActorIdentity) -> AppResult<DashboardStats> {
        self.require(actor, AdminPermission::RolesRead).await?;

        self.cache
            .get_or_load(DASHBOARD_STATS_CACHE_KEY, CacheTag::All, || async {
                self.dashboard_repository.dashboard_stats().await
            })
            .await
    }
}
