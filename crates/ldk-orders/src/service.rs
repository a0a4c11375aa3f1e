//! Order service: per-order serialization, storage, notification emission.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::info;
use uuid::Uuid;

use ldk_hub::NotificationHub;
use ldk_schemas::{ChannelKey, Notification, OrderStatus, Priority};

use crate::{AdvanceError, Order, OrderPriority, OrderStore, StatusChange};

// ---------------------------------------------------------------------------
// CreateError
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum CreateError {
    /// `order_number` is already taken (the number is unique and immutable).
    DuplicateOrderNumber(String),
    Storage(String),
}

impl std::fmt::Display for CreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateError::DuplicateOrderNumber(n) => write!(f, "order number {n} already exists"),
            CreateError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for CreateError {}

// ---------------------------------------------------------------------------
// OrderService
// ---------------------------------------------------------------------------

/// The single mutator of order status.
///
/// Every `advance`/`cancel` runs the whole load-validate-save-emit sequence
/// under that order's own async mutex, so two concurrent advances on the
/// same order cannot both succeed from the same prior status: the loser
/// re-validates against the now-current status and observes
/// `InvalidTransition`.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    hub: Arc<NotificationHub>,
    /// Per-order-id locks. Orders are never deleted, so entries live for
    /// the process lifetime.
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, hub: Arc<NotificationHub>) -> Self {
        Self {
            store,
            hub,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new order at `Ordered`. Intake itself is an external
    /// concern; this is the entry point it calls.
    pub async fn create(
        &self,
        order_number: &str,
        priority: OrderPriority,
    ) -> Result<Order, CreateError> {
        let existing = self
            .store
            .load_by_number(order_number)
            .await
            .map_err(|e| CreateError::Storage(e.to_string()))?;
        if existing.is_some() {
            return Err(CreateError::DuplicateOrderNumber(order_number.to_string()));
        }
        let order = Order::new(order_number, priority);
        self.store
            .save_order(&order)
            .await
            .map_err(|e| CreateError::Storage(e.to_string()))?;
        info!(order_id = %order.id, order_number, "order created");
        Ok(order)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Option<Order>, AdvanceError> {
        self.store
            .load_order(order_id)
            .await
            .map_err(|e| AdvanceError::Storage(e.to_string()))
    }

    /// Advance `order_id` to `target`. On success exactly one
    /// `order_status_changed` notification is published, to the order's own
    /// channel and to the coarse `orders` channel.
    pub async fn advance(
        &self,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<StatusChange, AdvanceError> {
        let guard = self.lock_for(order_id);
        let _held = guard.lock().await;

        let mut order = self.load_required(order_id).await?;
        let change = order.advance(target)?;
        self.store
            .save_order(&order)
            .await
            .map_err(|e| AdvanceError::Storage(e.to_string()))?;

        info!(
            order_id = %order_id,
            previous = %change.previous,
            new = %change.new,
            "order advanced"
        );
        self.emit_status_change(&order, &change);
        Ok(change)
    }

    /// Cancel `order_id`. Same serialization and emission rules as
    /// `advance`; `Cancelled` is reachable only through here.
    pub async fn cancel(&self, order_id: Uuid) -> Result<StatusChange, AdvanceError> {
        let guard = self.lock_for(order_id);
        let _held = guard.lock().await;

        let mut order = self.load_required(order_id).await?;
        let change = order.cancel()?;
        self.store
            .save_order(&order)
            .await
            .map_err(|e| AdvanceError::Storage(e.to_string()))?;

        info!(order_id = %order_id, previous = %change.previous, "order cancelled");
        self.emit_status_change(&order, &change);
        Ok(change)
    }

    fn lock_for(&self, order_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("order lock map poisoned");
        Arc::clone(locks.entry(order_id).or_default())
    }

    async fn load_required(&self, order_id: Uuid) -> Result<Order, AdvanceError> {
        self.store
            .load_order(order_id)
            .await
            .map_err(|e| AdvanceError::Storage(e.to_string()))?
            .ok_or(AdvanceError::UnknownOrder { order_id })
    }

    fn emit_status_change(&self, order: &Order, change: &StatusChange) {
        let priority = match order.priority {
            OrderPriority::Routine => Priority::Normal,
            OrderPriority::Urgent => Priority::Urgent,
        };
        let notification = Notification::order_status_changed(
            change.order_id,
            &change.order_number,
            change.previous,
            change.new,
            priority,
        );
        // Fire-and-forget: publish outcomes are the hub's concern.
        let _ = self
            .hub
            .publish(&ChannelKey::order(&change.order_id), &notification);
        let _ = self.hub.publish(&ChannelKey::orders(), &notification);
    }
}
