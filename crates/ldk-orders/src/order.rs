//! Order entity and transition rules.
//!
//! # Invariants
//!
//! 1. **One step at a time.** `advance` accepts only the immediate
//!    successor of the current status; everything else is
//!    [`AdvanceError::InvalidTransition`] and leaves the order unchanged.
//! 2. **Terminal states stay terminal.** `Delivered` and `Cancelled` reject
//!    every further transition with [`AdvanceError::TerminalState`]; orders
//!    are retained for audit, never deleted.
//! 3. **Single mutator.** `advance` (and the explicit `cancel`) are the only
//!    paths that change `status`; callers serialize them per order id
//!    (see `OrderService`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ldk_schemas::OrderStatus;

// ---------------------------------------------------------------------------
// OrderPriority
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    Routine,
    Urgent,
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// One diagnostic test order tracked through the lab lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Opaque identifier, immutable.
    pub id: Uuid,
    /// Human-readable number, unique, immutable.
    pub order_number: String,
    pub status: OrderStatus,
    pub priority: OrderPriority,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful transition; the payload of the emitted
/// `order_status_changed` notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: Uuid,
    pub order_number: String,
    pub previous: OrderStatus,
    pub new: OrderStatus,
}

impl Order {
    pub fn new(order_number: impl Into<String>, priority: OrderPriority) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_number: order_number.into(),
            status: OrderStatus::Ordered,
            priority,
            created_at: Utc::now(),
        }
    }

    /// Move this order to `target`.
    ///
    /// Succeeds only when `target` is the immediate successor of the
    /// current status. Skipping ahead requires a force authority this
    /// system does not model and is therefore always an error.
    pub fn advance(&mut self, target: OrderStatus) -> Result<StatusChange, AdvanceError> {
        if self.status.is_terminal() {
            return Err(AdvanceError::TerminalState {
                order_id: self.id,
                status: self.status,
            });
        }
        if self.status.successor() != Some(target) {
            return Err(AdvanceError::InvalidTransition {
                from: self.status,
                attempted: target,
            });
        }
        let previous = self.status;
        self.status = target;
        Ok(StatusChange {
            order_id: self.id,
            order_number: self.order_number.clone(),
            previous,
            new: target,
        })
    }

    /// Cancel this order. Legal from any non-terminal status; `Cancelled`
    /// is terminal and is never reachable through `advance`.
    pub fn cancel(&mut self) -> Result<StatusChange, AdvanceError> {
        if self.status.is_terminal() {
            return Err(AdvanceError::TerminalState {
                order_id: self.id,
                status: self.status,
            });
        }
        let previous = self.status;
        self.status = OrderStatus::Cancelled;
        Ok(StatusChange {
            order_id: self.id,
            order_number: self.order_number.clone(),
            previous,
            new: OrderStatus::Cancelled,
        })
    }
}

// ---------------------------------------------------------------------------
// AdvanceError
// ---------------------------------------------------------------------------

/// Why a transition was refused. The order is unchanged and no
/// notification was emitted.
#[derive(Clone, Debug, PartialEq)]
pub enum AdvanceError {
    /// `attempted` is not the immediate successor of `from`.
    InvalidTransition {
        from: OrderStatus,
        attempted: OrderStatus,
    },
    /// The order is in a terminal status.
    TerminalState {
        order_id: Uuid,
        status: OrderStatus,
    },
    /// No order with this id exists.
    UnknownOrder { order_id: Uuid },
    /// The storage collaborator failed.
    Storage(String),
}

impl std::fmt::Display for AdvanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvanceError::InvalidTransition { from, attempted } => {
                write!(f, "invalid transition: {from} -> {attempted}")
            }
            AdvanceError::TerminalState { order_id, status } => {
                write!(f, "order {order_id} is terminal ({status})")
            }
            AdvanceError::UnknownOrder { order_id } => write!(f, "unknown order {order_id}"),
            AdvanceError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for AdvanceError {}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
