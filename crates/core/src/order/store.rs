//! Order storage trait and query types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{NewOrder, Order, OrderStatus};

/// Error type for order store operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Store API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse store response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for OrderError {
    fn from(e: reqwest::Error) -> Self {
        OrderError::Network(e.to_string())
    }
}

/// Filter for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Filter by decision status.
    pub status: Option<OrderStatus>,
    /// Maximum number of results.
    pub limit: i64,
}

impl OrderFilter {
    /// Create a new filter with defaults (10 newest orders).
    pub fn new() -> Self {
        Self {
            status: None,
            limit: 10,
        }
    }

    /// Filter by status.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// Trait for order storage backends.
///
/// The sequence counter is exposed as separate read and write operations and
/// is NOT atomic: the workflow performs read, increment, write as distinct
/// calls. Concurrent approvals can observe the same value.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a decided order.
    async fn insert(&self, order: NewOrder) -> Result<(), OrderError>;

    /// Find an order by its customer-supplied id.
    async fn find(&self, order_id: &str) -> Result<Option<Order>, OrderError>;

    /// List orders matching the filter, newest first.
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError>;

    /// Mark an accepted order as closed.
    async fn close(
        &self,
        order_id: &str,
        closed_by: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<(), OrderError>;

    /// Read the last assigned sequence number. `None` when the counter row
    /// does not exist yet (no order was ever approved).
    async fn read_counter(&self) -> Result<Option<i64>, OrderError>;

    /// Write the counter value. `insert` creates the row instead of
    /// updating it (first approval ever).
    async fn write_counter(&self, value: i64, insert: bool) -> Result<(), OrderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() {
        let filter = OrderFilter::new();
        assert!(filter.status.is_none());
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn test_filter_builders() {
        let filter = OrderFilter::new()
            .with_status(OrderStatus::Rejected)
            .with_limit(5);
        assert_eq!(filter.status, Some(OrderStatus::Rejected));
        assert_eq!(filter.limit, 5);
    }
}
