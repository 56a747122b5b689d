//! SQLite persistence for the audit trail.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};

use super::{AuditError, AuditQuery, AuditRecord, AuditStore};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS audit_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        event_type TEXT NOT NULL,
        order_id TEXT,
        user_id TEXT,
        data TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_audit_events_timestamp ON audit_events(timestamp);
    CREATE INDEX IF NOT EXISTS idx_audit_events_order_id ON audit_events(order_id);
    CREATE INDEX IF NOT EXISTS idx_audit_events_event_type ON audit_events(event_type);
    CREATE INDEX IF NOT EXISTS idx_audit_events_user_id ON audit_events(user_id);
"#;

impl From<rusqlite::Error> for AuditError {
    fn from(e: rusqlite::Error) -> Self {
        AuditError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        AuditError::Codec(e.to_string())
    }
}

/// `AuditStore` over a single SQLite connection. The event payload is kept
/// as a JSON column next to the indexed extraction columns.
pub struct SqliteAuditStore {
    conn: Mutex<Connection>,
}

impl SqliteAuditStore {
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Keeps the trail in memory; used by tests and the server test harness.
    pub fn in_memory() -> Result<Self, AuditError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AuditError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Translate the query's filters into a WHERE fragment plus its bound
    /// string arguments, in matching order.
    fn filters(query: &AuditQuery) -> (String, Vec<String>) {
        let mut conditions: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(ref order_id) = query.order_id {
            conditions.push("order_id = ?");
            args.push(order_id.clone());
        }
        if let Some(ref event_type) = query.event_type {
            conditions.push("event_type = ?");
            args.push(event_type.clone());
        }
        if let Some(ref user_id) = query.user_id {
            conditions.push("user_id = ?");
            args.push(user_id.clone());
        }
        if let Some(from) = query.from {
            conditions.push("timestamp >= ?");
            args.push(from.to_rfc3339());
        }
        if let Some(to) = query.to {
            conditions.push("timestamp <= ?");
            args.push(to.to_rfc3339());
        }

        if conditions.is_empty() {
            (String::new(), args)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), args)
        }
    }

    fn record_from_row(row: &Row<'_>) -> Result<AuditRecord, AuditError> {
        let timestamp_raw: String = row.get(1)?;
        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&timestamp_raw)
            .map_err(|e| AuditError::Codec(format!("bad timestamp {timestamp_raw}: {e}")))?
            .into();
        let data_raw: String = row.get(5)?;

        Ok(AuditRecord {
            id: row.get(0)?,
            timestamp,
            event_type: row.get(2)?,
            order_id: row.get(3)?,
            user_id: row.get(4)?,
            data: serde_json::from_str(&data_raw)?,
        })
    }
}

impl AuditStore for SqliteAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let data = serde_json::to_string(&record.data)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO audit_events (timestamp, event_type, order_id, user_id, data) VALUES (?, ?, ?, ?, ?)",
            params![
                record.timestamp.to_rfc3339(),
                record.event_type,
                record.order_id,
                record.user_id,
                data,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn query(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, AuditError> {
        let (where_clause, args) = Self::filters(query);
        // limit and offset are integers formatted straight into the SQL.
        let sql = format!(
            "SELECT id, timestamp, event_type, order_id, user_id, data FROM audit_events \
             {where_clause} ORDER BY timestamp DESC LIMIT {} OFFSET {}",
            query.limit.max(0),
            query.offset.max(0),
        );

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(args))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Self::record_from_row(row)?);
        }
        Ok(records)
    }

    fn count(&self, query: &AuditQuery) -> Result<i64, AuditError> {
        let (where_clause, args) = Self::filters(query);
        let sql = format!("SELECT COUNT(*) FROM audit_events {where_clause}");

        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(&sql, params_from_iter(args), |row| row.get(0))?;
        Ok(count)
    }
}
