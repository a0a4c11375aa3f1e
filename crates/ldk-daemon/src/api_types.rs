//! Request and response types for all ldk-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ldk_orders::OrderPriority;
use ldk_schemas::{OrderStatus, ReceiptAction};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// /v1/status
// ---------------------------------------------------------------------------

/// Point-in-time snapshot of daemon state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub daemon_uptime_secs: u64,
    pub connected_sessions: usize,
    pub active_channels: usize,
    pub orders_tracked: usize,
    /// SHA-256 of the effective config this process runs with.
    pub config_fingerprint: String,
}

// ---------------------------------------------------------------------------
// /v1/sessions
// ---------------------------------------------------------------------------

/// One live connection, for ops dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub session_id: Uuid,
    pub recipient_id: String,
    pub subscribed_channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionRow>,
}

// ---------------------------------------------------------------------------
// Refusals
// ---------------------------------------------------------------------------

/// Response body when a request is refused by domain rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefusedResponse {
    pub error: String,
    /// "invalid_transition" | "terminal_state" | "unknown_order" |
    /// "duplicate_order_number" | "storage"
    pub reason: String,
}

// ---------------------------------------------------------------------------
// /v1/orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub order_number: String,
    #[serde(default = "default_priority")]
    pub priority: OrderPriority,
}

fn default_priority() -> OrderPriority {
    OrderPriority::Routine
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub priority: OrderPriority,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ldk_orders::Order> for OrderResponse {
    fn from(order: ldk_orders::Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            status: order.status,
            priority: order.priority,
            created_at: order.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// /v1/orders/:id/advance  /v1/orders/:id/cancel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub target_status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceResponse {
    pub order_id: Uuid,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
}

// ---------------------------------------------------------------------------
// /v1/artifacts/:artifact_id/receipts/:recipient_id
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordReceiptRequest {
    pub action: ReceiptAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptResponse {
    pub artifact_id: String,
    pub recipient_id: String,
    /// "unsent" | "sent" | "delivered" | "viewed" | "downloaded"
    pub status: String,
    /// Whether this request actually moved the maturity up.
    pub changed: bool,
}
