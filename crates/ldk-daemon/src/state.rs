//! Shared runtime state for ldk-daemon.
//!
//! All handlers receive `State<Arc<AppState>>` from Axum; this module owns
//! nothing async itself beyond the hub/service handles it constructs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ldk_config::DaemonConfig;
use ldk_hub::{DedupConfig, HubConfig, NotificationHub, SessionId};
use ldk_orders::{OrderService, OrderStore};
use ldk_receipts::{AcknowledgmentTracker, ReceiptStore};
use ldk_schemas::{AuthContext, Notification, ReceiptAction, ServerEvent};
use ldk_session::ActionRouter;
use ldk_store::MemoryStore;

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health / status responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers and sessions.
pub struct AppState {
    pub build: BuildInfo,
    pub config: DaemonConfig,
    pub hub: Arc<NotificationHub>,
    pub orders: Arc<OrderService>,
    pub receipts: Arc<AcknowledgmentTracker>,
    pub store: Arc<MemoryStore>,
    pub router: Arc<dyn ActionRouter>,
}

impl AppState {
    pub fn new(config: DaemonConfig) -> Arc<Self> {
        let hub = Arc::new(NotificationHub::new(HubConfig {
            outbound_capacity: config.hub.outbound_capacity,
            dedup: DedupConfig {
                capacity: config.hub.dedup_capacity,
                retention: Duration::from_secs(config.hub.dedup_retention_secs),
            },
        }));
        let store = Arc::new(MemoryStore::new());
        let orders = Arc::new(OrderService::new(
            Arc::clone(&store) as Arc<dyn OrderStore>,
            Arc::clone(&hub),
        ));
        let receipts = Arc::new(AcknowledgmentTracker::new(
            Arc::clone(&store) as Arc<dyn ReceiptStore>,
            Arc::clone(&hub),
        ));
        let router = Arc::new(DaemonRouter {
            orders: Arc::clone(&orders),
            receipts: Arc::clone(&receipts),
            hub: Arc::clone(&hub),
        });

        Arc::new(Self {
            build: BuildInfo {
                service: "ldk-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            config,
            hub,
            orders,
            receipts,
            store,
            router,
        })
    }
}

// ---------------------------------------------------------------------------
// DaemonRouter
// ---------------------------------------------------------------------------

/// Routes session passthrough commands into the order service and the
/// acknowledgment tracker.
pub struct DaemonRouter {
    orders: Arc<OrderService>,
    receipts: Arc<AcknowledgmentTracker>,
    hub: Arc<NotificationHub>,
}

#[async_trait]
impl ActionRouter for DaemonRouter {
    async fn acknowledge(
        &self,
        auth: &AuthContext,
        artifact_id: &str,
        action: ReceiptAction,
    ) -> anyhow::Result<()> {
        self.receipts
            .record(artifact_id, &auth.recipient_id, action)
            .await?;
        Ok(())
    }

    /// Pull hint: answered by pushing the order's current status straight to
    /// the requesting session only. Unknown resources are reported back as
    /// an error by the session.
    async fn request_update(
        &self,
        _auth: &AuthContext,
        session_id: SessionId,
        resource_type: &str,
        resource_id: &str,
    ) -> anyhow::Result<()> {
        if resource_type != "orders" {
            anyhow::bail!("unsupported resource type {resource_type}");
        }
        let order_id: uuid::Uuid = resource_id
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid order id {resource_id}"))?;
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("unknown order {order_id}"))?;

        let snapshot =
            Notification::order_snapshot(order.id, &order.order_number, order.status);
        self.hub.send_to_session(
            session_id,
            ServerEvent::Notification {
                notification: snapshot,
            },
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}
