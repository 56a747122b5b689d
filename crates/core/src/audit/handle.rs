use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::AuditEvent;

/// An event stamped with its emission time, as carried on the channel to
/// the writer.
#[derive(Debug, Clone)]
pub struct AuditEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

/// Cheap-to-clone sender side of the audit channel. Emission is fire and
/// forget: a full or closed channel is logged, never surfaced to the
/// workflow that emitted.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEnvelope>,
}

impl AuditHandle {
    pub fn new(tx: mpsc::Sender<AuditEnvelope>) -> Self {
        Self { tx }
    }

    pub async fn emit(&self, event: AuditEvent) {
        let envelope = AuditEnvelope {
            timestamp: Utc::now(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!("Audit event dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> AuditEvent {
        AuditEvent::ServiceStarted {
            version: "0.1.0".to_string(),
            config_hash: "abc123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_emit_stamps_and_delivers() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = AuditHandle::new(tx);

        let before = Utc::now();
        handle.emit(started()).await;

        let envelope = rx.recv().await.unwrap();
        assert!(matches!(envelope.event, AuditEvent::ServiceStarted { .. }));
        assert!(envelope.timestamp >= before);
        assert!(envelope.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_clones_feed_the_same_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = AuditHandle::new(tx);
        let clone = handle.clone();

        handle.emit(started()).await;
        clone
            .emit(AuditEvent::ServiceStopped {
                reason: "test".to_string(),
            })
            .await;

        assert!(matches!(
            rx.recv().await.unwrap().event,
            AuditEvent::ServiceStarted { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap().event,
            AuditEvent::ServiceStopped { .. }
        ));
    }

    #[tokio::test]
    async fn test_emit_into_closed_channel_does_not_panic() {
        let (tx, rx) = mpsc::channel::<AuditEnvelope>(8);
        let handle = AuditHandle::new(tx);
        drop(rx);

        handle.emit(started()).await;
    }
}
