//! Inbound command and outbound event vocabulary for one client connection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ChannelKey, Notification, ReceiptAction};

// ---------------------------------------------------------------------------
// AuthContext
// ---------------------------------------------------------------------------

/// Opaque identity presented at connect time. The core never validates it;
/// it only routes mailbox and acknowledgment operations with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub recipient_id: String,
    /// e.g. "doctor", "staff", "patient"
    pub role: String,
    pub display_name: Option<String>,
}

impl AuthContext {
    pub fn new(recipient_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            role: role.into(),
            display_name: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientCommand (inbound)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Subscribe { channel: ChannelKey },
    Unsubscribe { channel: ChannelKey },
    MarkRead { notification_id: Uuid },
    MarkAllRead,
    Acknowledge { artifact_id: String, action: ReceiptAction },
    RequestUpdate { resource_type: String, resource_id: String },
    Typing { channel: ChannelKey, is_typing: bool },
    Ping,
}

// ---------------------------------------------------------------------------
// ServerEvent (outbound)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    Notification {
        #[serde(flatten)]
        notification: Notification,
    },
    /// Passthrough typing indicator; not part of the order state machine.
    Typing { user_id: String, is_typing: bool },
    Error { message: String },
    Subscribed { channel: ChannelKey },
    Unsubscribed { channel: ChannelKey },
    MarkedRead { notification_id: Uuid },
    AllMarkedRead { cleared: u64 },
    Pong { ts_millis: i64 },
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
