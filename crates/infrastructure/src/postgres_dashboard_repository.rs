use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use warden_application::{DashboardRepository, DashboardStats};
use warden_core::{AppError, AppResult};

/// PostgreSQL-backed repository for dashboard aggregates.
#[derive(Clone)]
pub struct PostgresDashboardRepository {
    pool: PgPool,
}

impl PostgresDashboardRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DashboardStatsRow {
    total_users: i64,
    total_roles: i64,
    system_roles: i64,
    total_permissions: i64,
    active_modules: i64,
    active_assignments: i64,
}

#[async_trait]
impl DashboardRepository for PostgresDashboardRepository {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let row = sqlx::query_as::<_, DashboardStatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM roles) AS total_roles,
                (SELECT COUNT(*) FROM roles WHERE is_system) AS system_roles,
                (SELECT COUNT(*) FROM permissions) AS total_permissions,
                (SELECT COUNT(*) FROM modules WHERE is_active) AS active_modules,
                (
                    SELECT COUNT(*)
                    FROM user_roles
                    WHERE expires_at IS NULL OR expires_at > now()
                ) AS active_assignments
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to load dashboard stats: {error}")))?;

        let count = |value: i64| u64::try_from(value).unwrap_or_default();
        Ok(DashboardStats {
            total_users: count(row.total_users),
            total_roles: count(row.total_roles),
            system_roles: count(row.system_roles),
            total_permissions: count(row.total_permissions),
            active_modules: count(row.active_modules),
            active_assignments: count(row.active_assignments),
        })
    }
}
