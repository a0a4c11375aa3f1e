//! Notification value and its typed payload variants.
//!
//! The payload is adjacently tagged and flattened into the notification, so
//! one notification serializes as
//! `{"id": …, "type": "order_status_changed", "data": {…}, …}` with a
//! statically known `data` shape per `type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{OrderStatus, ReceiptAction};

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

// ---------------------------------------------------------------------------
// NotificationPayload
// ---------------------------------------------------------------------------

/// Typed per-kind payload. Each notification kind has an exhaustively
/// handled shape; there is no free-form key/value map on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NotificationPayload {
    OrderStatusChanged {
        order_id: Uuid,
        order_number: String,
        previous_status: OrderStatus,
        new_status: OrderStatus,
    },
    ReportAcknowledged {
        artifact_id: String,
        recipient_id: String,
        action: ReceiptAction,
    },
    ReportReady {
        artifact_id: String,
        order_id: Uuid,
        test_name: String,
    },
    /// Answer to a `request_update` pull hint: the resource's current state.
    OrderSnapshot {
        order_id: Uuid,
        order_number: String,
        status: OrderStatus,
    },
    SystemAnnouncement {},
}

impl NotificationPayload {
    /// Wire name of this payload kind (the `type` field value).
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationPayload::OrderStatusChanged { .. } => "order_status_changed",
            NotificationPayload::ReportAcknowledged { .. } => "report_acknowledged",
            NotificationPayload::ReportReady { .. } => "report_ready",
            NotificationPayload::OrderSnapshot { .. } => "order_snapshot",
            NotificationPayload::SystemAnnouncement {} => "system_announcement",
        }
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// One event pushed to subscribers. `id` is the dedup key on replay or
/// upstream resend; read state is tracked per recipient mailbox, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    #[serde(flatten)]
    pub payload: NotificationPayload,
    pub created_at: DateTime<Utc>,
    /// Points back at the order or artifact that caused this event.
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    pub fn order_status_changed(
        order_id: Uuid,
        order_number: &str,
        previous_status: OrderStatus,
        new_status: OrderStatus,
        priority: Priority,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Order status updated".to_string(),
            message: format!("Order {order_number}: {previous_status} -> {new_status}"),
            priority,
            payload: NotificationPayload::OrderStatusChanged {
                order_id,
                order_number: order_number.to_string(),
                previous_status,
                new_status,
            },
            created_at: Utc::now(),
            reference_id: Some(order_id.to_string()),
            reference_type: Some("order".to_string()),
        }
    }

    pub fn report_acknowledged(
        artifact_id: &str,
        recipient_id: &str,
        action: ReceiptAction,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Report acknowledged".to_string(),
            message: format!("Report {artifact_id} {action} by {recipient_id}"),
            priority: Priority::Low,
            payload: NotificationPayload::ReportAcknowledged {
                artifact_id: artifact_id.to_string(),
                recipient_id: recipient_id.to_string(),
                action,
            },
            created_at: Utc::now(),
            reference_id: Some(artifact_id.to_string()),
            reference_type: Some("report".to_string()),
        }
    }

    pub fn report_ready(artifact_id: &str, order_id: Uuid, test_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Report ready".to_string(),
            message: format!("New {test_name} report ready"),
            priority: Priority::Normal,
            payload: NotificationPayload::ReportReady {
                artifact_id: artifact_id.to_string(),
                order_id,
                test_name: test_name.to_string(),
            },
            created_at: Utc::now(),
            reference_id: Some(artifact_id.to_string()),
            reference_type: Some("report".to_string()),
        }
    }

    pub fn order_snapshot(order_id: Uuid, order_number: &str, status: OrderStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Order status".to_string(),
            message: format!("Order {order_number} is {status}"),
            priority: Priority::Low,
            payload: NotificationPayload::OrderSnapshot {
                order_id,
                order_number: order_number.to_string(),
                status,
            },
            created_at: Utc::now(),
            reference_id: Some(order_id.to_string()),
            reference_type: Some("order".to_string()),
        }
    }

    pub fn system_announcement(title: &str, message: &str, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: message.to_string(),
            priority,
            payload: NotificationPayload::SystemAnnouncement {},
            created_at: Utc::now(),
            reference_id: None,
            reference_type: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
