//! In-memory order store for testing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::order::{NewOrder, Order, OrderError, OrderFilter, OrderStatus, OrderStore};

/// Mock implementation of the [`OrderStore`] trait.
///
/// Provides controllable behavior for testing:
/// - Records every inserted order for assertions
/// - Simulates store failures via `set_next_error`
/// - Optional delay inside `read_counter`, to force the read/write
///   interleaving that produces duplicate sequence numbers
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
    counter: Arc<RwLock<Option<i64>>>,
    next_error: Arc<RwLock<Option<OrderError>>>,
    read_counter_delay: Arc<RwLock<Option<Duration>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored orders, in insertion order.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    /// Current counter value.
    pub async fn counter_value(&self) -> Option<i64> {
        *self.counter.read().await
    }

    /// Seed the counter row.
    pub async fn set_counter(&self, value: i64) {
        *self.counter.write().await = Some(value);
    }

    /// Fail the next store operation with the given error.
    pub async fn set_next_error(&self, error: OrderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Sleep inside `read_counter`, widening the read-to-write window.
    pub async fn set_read_counter_delay(&self, delay: Duration) {
        *self.read_counter_delay.write().await = Some(delay);
    }

    async fn take_error(&self) -> Result<(), OrderError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<(), OrderError> {
        self.take_error().await?;

        self.orders.write().await.push(Order {
            order_id: order.order_id,
            user_id: order.user_id,
            number: order.number,
            plan: order.plan,
            status: order.status,
            moderator_id: order.moderator_id,
            moderator_name: order.moderator_name,
            channel_id: order.channel_id,
            receipt_path: order.receipt_path,
            rejection_reason: order.rejection_reason,
            timestamp: order.timestamp,
            closed_at: None,
            closed_by: None,
        });
        Ok(())
    }

    async fn find(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        self.take_error().await?;

        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        self.take_error().await?;

        let orders = self.orders.read().await;
        let matching: Vec<Order> = orders
            .iter()
            .rev()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .take(filter.limit as usize)
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn close(
        &self,
        order_id: &str,
        closed_by: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.take_error().await?;

        let mut orders = self.orders.write().await;
        if let Some(order) = orders.iter_mut().find(|o| o.order_id == order_id) {
            order.status = OrderStatus::Closed;
            order.closed_at = Some(closed_at);
            order.closed_by = Some(closed_by.to_string());
        }
        Ok(())
    }

    async fn read_counter(&self) -> Result<Option<i64>, OrderError> {
        self.take_error().await?;

        let value = *self.counter.read().await;

        let delay = *self.read_counter_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(value)
    }

    async fn write_counter(&self, value: i64, _insert: bool) -> Result<(), OrderError> {
        self.take_error().await?;

        *self.counter.write().await = Some(value);
        Ok(())
    }
}
