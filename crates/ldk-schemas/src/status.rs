//! Order lifecycle statuses and receipt acknowledgment actions.
//!
//! # Invariants
//!
//! - [`OrderStatus`] values form one fixed forward sequence; an order may
//!   only move to the immediate successor of its current status. `Cancelled`
//!   sits outside the sequence and is reachable only through an explicit
//!   cancel operation, never through advancement.
//!
//! - [`ReceiptAction`] values are strictly ordered by maturity
//!   (`Sent < Delivered < Viewed < Downloaded`); a recipient's recorded
//!   action never decreases.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a diagnostic order.
///
/// | Status            | Successor         |
/// |-------------------|-------------------|
/// | `Ordered`         | `SampleCollected` |
/// | `SampleCollected` | `SampleReceived`  |
/// | `SampleReceived`  | `InProgress`      |
/// | `InProgress`      | `ResultEntered`   |
/// | `ResultEntered`   | `Verified`        |
/// | `Verified`        | `ReportGenerated` |
/// | `ReportGenerated` | `Delivered`       |
/// | `Delivered`       | terminal          |
/// | `Cancelled`       | terminal          |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Ordered,
    SampleCollected,
    SampleReceived,
    InProgress,
    ResultEntered,
    Verified,
    ReportGenerated,
    Delivered,
    /// Outside the advance sequence; set only by an explicit cancel.
    Cancelled,
}

impl OrderStatus {
    /// The full forward sequence, in order. `Cancelled` is not part of it.
    pub const SEQUENCE: [OrderStatus; 8] = [
        OrderStatus::Ordered,
        OrderStatus::SampleCollected,
        OrderStatus::SampleReceived,
        OrderStatus::InProgress,
        OrderStatus::ResultEntered,
        OrderStatus::Verified,
        OrderStatus::ReportGenerated,
        OrderStatus::Delivered,
    ];

    /// The immediate next status in the sequence, or `None` when terminal.
    pub fn successor(&self) -> Option<OrderStatus> {
        use OrderStatus::*;
        match self {
            Ordered => Some(SampleCollected),
            SampleCollected => Some(SampleReceived),
            SampleReceived => Some(InProgress),
            InProgress => Some(ResultEntered),
            ResultEntered => Some(Verified),
            Verified => Some(ReportGenerated),
            ReportGenerated => Some(Delivered),
            Delivered | Cancelled => None,
        }
    }

    /// `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Wire-format name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        use OrderStatus::*;
        match self {
            Ordered => "ordered",
            SampleCollected => "sample_collected",
            SampleReceived => "sample_received",
            InProgress => "in_progress",
            ResultEntered => "result_entered",
            Verified => "verified",
            ReportGenerated => "report_generated",
            Delivered => "delivered",
            Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReceiptAction
// ---------------------------------------------------------------------------

/// How far a delivered artifact has progressed toward being consumed by one
/// recipient. Derive order IS the maturity order; do not reorder variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptAction {
    Sent,
    Delivered,
    Viewed,
    Downloaded,
}

impl ReceiptAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptAction::Sent => "sent",
            ReceiptAction::Delivered => "delivered",
            ReceiptAction::Viewed => "viewed",
            ReceiptAction::Downloaded => "downloaded",
        }
    }
}

impl std::fmt::Display for ReceiptAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
