use chrono::{DateTime, Utc};
use thiserror::Error;

use super::AuditRecord;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit storage failed: {0}")]
    Storage(String),

    #[error("audit event codec failed: {0}")]
    Codec(String),
}

/// Selection criteria for reading back the trail. `limit` and `offset`
/// paginate `query`; `count` ignores them.
#[derive(Debug, Clone)]
pub struct AuditQuery {
    pub order_id: Option<String>,
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            order_id: None,
            event_type: None,
            user_id: None,
            from: None,
            to: None,
            limit: 100,
            offset: 0,
        }
    }
}

/// Storage backend for the audit trail. Writes come from the single
/// `AuditWriter` task; reads serve the `/audit` endpoint.
pub trait AuditStore: Send + Sync {
    /// Persist a record, returning its assigned id.
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError>;

    /// Matching records, newest first.
    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, AuditError>;

    /// Number of matching records, ignoring pagination.
    fn count(&self, query: &AuditQuery) -> Result<i64, AuditError>;
}
