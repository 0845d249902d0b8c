//! Audit trail event type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One immutable audit record describing a sensitive operation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Unique event id.
    pub id: String,
    /// User the operation was performed for.
    pub user_id: String,
    /// Operation name, e.g. `"credential.decrypt"`.
    pub action: String,
    /// Kind of resource touched, e.g. `"credential"`.
    pub resource_type: String,
    /// Id of the resource touched.
    pub resource_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Failure detail on unsuccessful operations. Never contains secrets.
    pub error: Option<String>,
    /// Event time.
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Event for a successful operation.
    #[must_use]
    pub fn success(user_id: &str, action: &str, resource_type: &str, resource_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            success: true,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Event for a failed operation. `error` must already be secret-free.
    #[must_use]
    pub fn failure(
        user_id: &str,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        error: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            success: false,
            error: Some(error.to_string()),
            timestamp: Utc::now(),
        }
    }
}
