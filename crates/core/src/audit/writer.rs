use std::sync::Arc;

use tokio::sync::mpsc;

use super::{AuditEnvelope, AuditHandle, AuditRecord, AuditStore};

/// Receiver side of the audit channel: drains envelopes into the store.
/// Runs until every `AuditHandle` has been dropped, so shutdown is just
/// dropping the handles and awaiting the spawned task.
pub struct AuditWriter {
    rx: mpsc::Receiver<AuditEnvelope>,
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    pub fn new(rx: mpsc::Receiver<AuditEnvelope>, store: Arc<dyn AuditStore>) -> Self {
        Self { rx, store }
    }

    pub async fn run(mut self) {
        tracing::info!("Audit writer started");

        while let Some(envelope) = self.rx.recv().await {
            let record = AuditRecord {
                id: 0,
                timestamp: envelope.timestamp,
                event_type: envelope.event.event_type().to_string(),
                order_id: envelope.event.order_id().map(String::from),
                user_id: envelope.event.user_id().map(String::from),
                data: envelope.event,
            };

            // A failed insert loses one record, not the writer.
            if let Err(e) = self.store.insert(&record) {
                tracing::error!("Failed to write audit event: {}", e);
            }
        }

        tracing::info!("Audit writer shutting down");
    }
}

/// Wire up the audit channel: the handle goes to the emitters, the writer
/// gets spawned with `tokio::spawn(writer.run())`.
pub fn create_audit_system(
    store: Arc<dyn AuditStore>,
    buffer_size: usize,
) -> (AuditHandle, AuditWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (AuditHandle::new(tx), AuditWriter::new(rx, store))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::audit::{AuditError, AuditEvent, AuditQuery};

    struct RecordingStore {
        records: Mutex<Vec<AuditRecord>>,
        fail_inserts: bool,
    }

    impl RecordingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
                fail_inserts: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
                fail_inserts: true,
            })
        }

        fn records(&self) -> Vec<AuditRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl AuditStore for RecordingStore {
        fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
            if self.fail_inserts {
                return Err(AuditError::Storage("disk full".to_string()));
            }
            let mut records = self.records.lock().unwrap();
            let id = records.len() as i64 + 1;
            let mut stored = record.clone();
            stored.id = id;
            records.push(stored);
            Ok(id)
        }

        fn query(&self, _query: &AuditQuery) -> Result<Vec<AuditRecord>, AuditError> {
            Ok(self.records())
        }

        fn count(&self, _query: &AuditQuery) -> Result<i64, AuditError> {
            Ok(self.records().len() as i64)
        }
    }

    fn approved(order_id: &str) -> AuditEvent {
        AuditEvent::OrderApproved {
            order_id: order_id.to_string(),
            number: 1,
            user_id: "42".to_string(),
            moderator_id: "99".to_string(),
            channel_id: "777".to_string(),
            plan: "Starter".to_string(),
        }
    }

    #[tokio::test]
    async fn test_writer_extracts_ids_and_stores() {
        let store = RecordingStore::new();
        let (handle, writer) = create_audit_system(store.clone(), 16);
        let writer_task = tokio::spawn(writer.run());

        handle.emit(approved("1234")).await;
        drop(handle);
        writer_task.await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type, "order_approved");
        assert_eq!(records[0].order_id.as_deref(), Some("1234"));
        assert_eq!(records[0].user_id.as_deref(), Some("99"));
    }

    #[tokio::test]
    async fn test_writer_survives_insert_failures() {
        let store = RecordingStore::failing();
        let (handle, writer) = create_audit_system(store, 16);
        let writer_task = tokio::spawn(writer.run());

        handle.emit(approved("1234")).await;
        handle.emit(approved("5678")).await;
        drop(handle);

        // The writer drains the channel and exits cleanly despite the errors.
        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_events_in_order() {
        // The sequence main.rs performs: emit the final event, drop every
        // handle clone, then await the writer.
        let store = RecordingStore::new();
        let (handle, writer) = create_audit_system(store.clone(), 16);
        let workflow_handle = handle.clone();
        let writer_task = tokio::spawn(writer.run());

        workflow_handle.emit(approved("1234")).await;
        handle
            .emit(AuditEvent::ServiceStopped {
                reason: "graceful_shutdown".to_string(),
            })
            .await;

        drop(workflow_handle);
        drop(handle);
        tokio::time::timeout(std::time::Duration::from_secs(1), writer_task)
            .await
            .expect("writer exits once all handles are gone")
            .unwrap();

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_type, "order_approved");
        assert_eq!(records[1].event_type, "service_stopped");
    }
}
