//! Audit trail destination.

use async_trait::async_trait;

use crate::types::AuditEvent;

/// Destination for audit events.
///
/// Delivery is best effort: services never fail an operation because the
/// sink could not accept the event.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Deliver one event.
    async fn send(&self, event: AuditEvent);
}

/// Sink that writes events to the application log.
#[derive(Debug, Default)]
pub struct LogAuditSink;

impl LogAuditSink {
    /// Create a log-backed sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for LogAuditSink {
    async fn send(&self, event: AuditEvent) {
        if event.success {
            log::info!(
                "audit: user={} action={} {}={}",
                event.user_id,
                event.action,
                event.resource_type,
                event.resource_id
            );
        } else {
            log::warn!(
                "audit: user={} action={} {}={} failed: {}",
                event.user_id,
                event.action,
                event.resource_type,
                event.resource_id,
                event.error.as_deref().unwrap_or("unknown")
            );
        }
    }
}
