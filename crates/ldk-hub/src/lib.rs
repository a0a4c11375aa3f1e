//! Notification fan-out hub.
//!
//! Central registry mapping channels to live subscriber sessions. Publish is
//! best-effort and not durable: a session that is not connected (and
//! subscribed) at publish time never receives that notification.
//!
//! # Design
//!
//! - One bounded outbound queue per session; the hub only ever `try_send`s,
//!   so a publisher never blocks on a dead or slow transport. A full or
//!   closed queue drops the session from the affected channel.
//! - Duplicate `notification.id`s republished to the same channel are
//!   suppressed per (session, channel) within a bounded recently-seen
//!   window; memory stays bounded at the cost of imperfect dedup for very
//!   old replays.
//! - All registry state lives behind one `RwLock`; every operation is a
//!   single short critical section with no await inside.

mod dedup;
mod hub;

pub use dedup::{DedupConfig, RecentIds};
pub use hub::{
    HubConfig, MailboxEntry, NotificationHub, PublishReport, SessionId, SessionInfo,
};
