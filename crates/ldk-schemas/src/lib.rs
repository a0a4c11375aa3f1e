//! Shared wire and data types for the LabDesk realtime core.
//!
//! Everything here is `Serialize + Deserialize` plain data. The lifecycle
//! sequence ([`OrderStatus`]) and acknowledgment maturity ([`ReceiptAction`])
//! enums live here because they appear on the wire; the services that
//! enforce their rules live in `ldk-orders` and `ldk-receipts`.

mod channel;
mod notification;
mod protocol;
mod status;

pub use channel::ChannelKey;
pub use notification::{Notification, NotificationPayload, Priority};
pub use protocol::{AuthContext, ClientCommand, ServerEvent};
pub use status::{OrderStatus, ReceiptAction};
