//! In-memory storage backing the order and receipt ports.
//!
//! Real persistence is an external collaborator of this system; the core
//! only requires per-key linearizable reads and writes, which a map behind
//! an `RwLock` provides. This is the storage the daemon ships with and the
//! storage every scenario test runs against.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use ldk_orders::{Order, OrderStore};
use ldk_receipts::{DeliveryReceipt, ReceiptStore};

/// Shared in-memory store for orders and receipts.
#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<Uuid, Order>>,
    receipts: RwLock<HashMap<(String, String), DeliveryReceipt>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().expect("order map poisoned").len()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn load_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.orders.read().expect("order map poisoned").get(&id).cloned())
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        self.orders
            .write()
            .expect("order map poisoned")
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn load_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        Ok(self
            .orders
            .read()
            .expect("order map poisoned")
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }
}

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn load_receipt(
        &self,
        artifact_id: &str,
        recipient_id: &str,
    ) -> Result<Option<DeliveryReceipt>> {
        Ok(self
            .receipts
            .read()
            .expect("receipt map poisoned")
            .get(&(artifact_id.to_string(), recipient_id.to_string()))
            .cloned())
    }

    async fn save_receipt(&self, receipt: &DeliveryReceipt) -> Result<()> {
        self.receipts.write().expect("receipt map poisoned").insert(
            (receipt.artifact_id.clone(), receipt.recipient_id.clone()),
            receipt.clone(),
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ldk_orders::OrderPriority;
    use ldk_schemas::ReceiptAction;

    #[tokio::test]
    async fn order_round_trip() {
        let store = MemoryStore::new();
        let order = Order::new("ORD-1", OrderPriority::Routine);
        store.save_order(&order).await.unwrap();

        let loaded = store.load_order(order.id).await.unwrap().unwrap();
        assert_eq!(loaded, order);
        let by_number = store.load_by_number("ORD-1").await.unwrap().unwrap();
        assert_eq!(by_number.id, order.id);
        assert!(store.load_by_number("ORD-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_overwrites_per_key() {
        let store = MemoryStore::new();
        let mut order = Order::new("ORD-1", OrderPriority::Urgent);
        store.save_order(&order).await.unwrap();
        order.status = ldk_schemas::OrderStatus::SampleCollected;
        store.save_order(&order).await.unwrap();

        let loaded = store.load_order(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ldk_schemas::OrderStatus::SampleCollected);
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn receipt_keyed_by_artifact_and_recipient() {
        let store = MemoryStore::new();
        let r1 = DeliveryReceipt::new("A1", "R1", ReceiptAction::Sent);
        let r2 = DeliveryReceipt::new("A1", "R2", ReceiptAction::Viewed);
        store.save_receipt(&r1).await.unwrap();
        store.save_receipt(&r2).await.unwrap();

        let loaded = store.load_receipt("A1", "R1").await.unwrap().unwrap();
        assert_eq!(loaded.action, ReceiptAction::Sent);
        let loaded = store.load_receipt("A1", "R2").await.unwrap().unwrap();
        assert_eq!(loaded.action, ReceiptAction::Viewed);
        assert!(store.load_receipt("A2", "R1").await.unwrap().is_none());
    }
}
