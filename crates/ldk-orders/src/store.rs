//! Storage port for orders.
//!
//! The core never assumes a storage technology; implementations must make
//! reads and writes linearizable per order id. `ldk-store` ships the
//! in-memory implementation.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::Order;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn load_order(&self, id: Uuid) -> Result<Option<Order>>;

    async fn save_order(&self, order: &Order) -> Result<()>;

    /// Lookup by the human-readable order number (unique).
    async fn load_by_number(&self, order_number: &str) -> Result<Option<Order>>;
}
