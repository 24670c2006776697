use serde_json::json;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use warden_application::{AuditEvent, AuditLogQuery, AuditLogRepository, AuditRepository};
use warden_core::UserId;
use warden_domain::{AuditAction, USER_MANAGEMENT_MODULE};

use super::PostgresAuditLogRepository;
use crate::PostgresAuditRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres audit log tests: {error}");
    }

    Some(pool)
}

fn event(actor: UserId, action: AuditAction, resource_id: &str) -> AuditEvent {
    AuditEvent {
        actor: Some(actor),
        action,
        module: USER_MANAGEMENT_MODULE.to_owned(),
        resource_type: "role".to_owned(),
        resource_id: Some(resource_id.to_owned()),
        changes: Some(json!({ "resource": resource_id })),
    }
}

#[tokio::test]
async fn entries_are_filtered_by_actor_and_action_newest_first() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let writer = PostgresAuditRepository::new(pool.clone());
    let reader = PostgresAuditLogRepository::new(pool);
    let actor = UserId::new();

    for (action, resource_id) in [
        (AuditAction::RoleCreated, "first"),
        (AuditAction::RoleUpdated, "second"),
        (AuditAction::RoleCreated, "third"),
    ] {
        assert!(writer.append_event(event(actor, action, resource_id)).await.is_ok());
    }

    let entries = reader
        .list_recent_entries(AuditLogQuery {
            user_id: Some(actor),
            ..AuditLogQuery::default()
        })
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].resource_id.as_deref(), Some("third"));
    assert_eq!(entries[0].module, USER_MANAGEMENT_MODULE);

    let created = reader
        .list_recent_entries(AuditLogQuery {
            user_id: Some(actor),
            action: Some(AuditAction::RoleCreated.as_str().to_owned()),
            ..AuditLogQuery::default()
        })
        .await
        .unwrap_or_default();
    assert_eq!(created.len(), 2);
    assert!(
        created
            .iter()
            .all(|entry| entry.action == AuditAction::RoleCreated.as_str())
    );
}

#[tokio::test]
async fn limit_and_offset_page_through_entries() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let writer = PostgresAuditRepository::new(pool.clone());
    let reader = PostgresAuditLogRepository::new(pool);
    let actor = UserId::new();

    for index in 0..4 {
        let appended = writer
            .append_event(event(actor, AuditAction::RoleAssigned, &format!("entry-{index}")))
            .await;
        assert!(appended.is_ok());
    }

    let page = reader
        .list_recent_entries(AuditLogQuery {
            limit: 2,
            offset: 2,
            user_id: Some(actor),
            ..AuditLogQuery::default()
        })
        .await
        .unwrap_or_default();
    assert_eq!(page.len(), 2);

    let zero_limit = reader
        .list_recent_entries(AuditLogQuery {
            limit: 0,
            user_id: Some(actor),
            ..AuditLogQuery::default()
        })
        .await
        .unwrap_or_default();
    assert_eq!(zero_limit.len(), 1);
}
