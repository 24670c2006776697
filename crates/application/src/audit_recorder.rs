use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::error;

use crate::rbac_ports::{AuditEvent, AuditRepository};

const REDACTED: &str = "[REDACTED]";
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "cookie",
    "api_key",
];

/// Best-effort writer for activity log entries.
#[derive(Clone)]
pub struct AuditRecorder {
    repository: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    /// Creates a recorder from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Appends an event after redacting sensitive change fields.
    ///
    /// Failures are logged and never returned; the mutation being audited has already happened.
    pub async fn record(&self, mut event: AuditEvent) {
        event.changes = event.changes.map(sanitize_changes);
        let action = event.action.as_str();
        let resource_id = event.resource_id.clone().unwrap_or_default();

        if let Err(error) = self.repository.append_event(event).await {
            error!(
                action,
                resource_id = %resource_id,
                error = %error,
                "failed to record rbac activity"
            );
        }
    }
}

/// Replaces values stored under sensitive keys, recursing into objects and arrays.
#[must_use]
pub fn sanitize_changes(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| {
                    if is_sensitive_key(&key) {
                        (key, Value::String(REDACTED.to_owned()))
                    } else {
                        (key, sanitize_changes(value))
                    }
                })
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_changes).collect()),
        other => other,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|sensitive| key.contains(sensitive))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    use warden_core::{AppError, AppResult};
    use warden_domain::AuditAction;

    use super::{AuditRecorder, sanitize_changes};
    use crate::rbac_ports::{AuditEvent, AuditRepository};

    #[derive(Default)]
    struct FakeAuditRepository {
        events: Mutex<Vec<AuditEvent>>,
        fail: bool,
    }

    #[async_trait]
    impl AuditRepository for FakeAuditRepository {
        async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Store("activity_logs unavailable".to_owned()));
            }
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    fn event(changes: serde_json::Value) -> AuditEvent {
        AuditEvent {
            actor: None,
            action: AuditAction::RoleAssigned,
            module: "user_management".to_owned(),
            resource_type: "user_role".to_owned(),
            resource_id: Some("u:r".to_owned()),
            changes: Some(changes),
        }
    }

    #[test]
    fn sensitive_keys_are_redacted_recursively() {
        let sanitized = sanitize_changes(json!({
            "metadata": { "Api_Key": "abc", "note": "ok", "nested": [{ "password": "x" }] },
            "access_token": "t",
        }));

        assert_eq!(sanitized["metadata"]["Api_Key"], "[REDACTED]");
        assert_eq!(sanitized["metadata"]["note"], "ok");
        assert_eq!(sanitized["metadata"]["nested"][0]["password"], "[REDACTED]");
        assert_eq!(sanitized["access_token"], "[REDACTED]");
    }

    #[tokio::test]
    async fn record_writes_sanitized_event() {
        let repository = Arc::new(FakeAuditRepository::default());
        let recorder = AuditRecorder::new(repository.clone());

        recorder.record(event(json!({ "secret": "s" }))).await;

        let events = repository.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].changes.as_ref().map(|changes| changes["secret"].clone()),
            Some(json!("[REDACTED]"))
        );
    }

    #[tokio::test]
    async fn record_swallows_store_failures() {
        let repository = Arc::new(FakeAuditRepository {
            fail: true,
            ..FakeAuditRepository::default()
        });
        let recorder = AuditRecorder::new(repository);

        recorder.record(event(json!({}))).await;
    }
}
