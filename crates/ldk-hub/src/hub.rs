//! Channel registry, publish fan-out, and per-session mailboxes.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use ldk_schemas::{ChannelKey, Notification, ServerEvent};

use crate::dedup::{DedupConfig, RecentIds};

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Identifier of one live connection. A reconnect is a new session with a
/// new id; ids are never reused across the gap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Config / reports
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug)]
pub struct HubConfig {
    /// Bounded outbound queue depth per session.
    pub outbound_capacity: usize,
    pub dedup: DedupConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            dedup: DedupConfig::default(),
        }
    }
}

/// Counts returned by [`NotificationHub::publish`]. Fire-and-forget: the
/// publisher never learns which sessions failed, only how many.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub deduped: usize,
    pub dropped: usize,
}

/// One entry in a session's mailbox. `read` is local to this session's copy.
#[derive(Clone, Debug)]
pub struct MailboxEntry {
    pub notification: Notification,
    pub read: bool,
}

/// Introspection row for ops/status endpoints.
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub recipient_id: String,
    pub subscribed_channels: Vec<ChannelKey>,
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

struct SessionEntry {
    recipient_id: String,
    tx: mpsc::Sender<ServerEvent>,
    mailbox: Vec<MailboxEntry>,
    channels: HashSet<ChannelKey>,
}

struct ChannelSub {
    seen: RecentIds,
}

#[derive(Default)]
struct HubInner {
    sessions: HashMap<SessionId, SessionEntry>,
    channels: HashMap<ChannelKey, HashMap<SessionId, ChannelSub>>,
}

// ---------------------------------------------------------------------------
// NotificationHub
// ---------------------------------------------------------------------------

/// Central fan-out registry. Cheap to share behind an `Arc`; every method
/// takes `&self` and holds the inner lock for one short critical section
/// with no await points.
pub struct NotificationHub {
    cfg: HubConfig,
    inner: RwLock<HubInner>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl NotificationHub {
    pub fn new(cfg: HubConfig) -> Self {
        Self {
            cfg,
            inner: RwLock::new(HubInner::default()),
        }
    }

    // -----------------------------------------------------------------------
    // Session registration
    // -----------------------------------------------------------------------

    /// Register a new session under no channels and hand back its outbound
    /// queue. The caller (session task) drains the receiver; dropping it
    /// causes subsequent deliveries to count as failures and the session to
    /// be forgotten.
    pub fn register(
        &self,
        session_id: SessionId,
        recipient_id: &str,
    ) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(self.cfg.outbound_capacity);
        let mut inner = self.inner.write().expect("hub lock poisoned");
        inner.sessions.insert(
            session_id,
            SessionEntry {
                recipient_id: recipient_id.to_string(),
                tx,
                mailbox: Vec::new(),
                channels: HashSet::new(),
            },
        );
        debug!(%session_id, recipient_id, "session registered");
        rx
    }

    /// Forget a session: removed from every channel, mailbox dropped,
    /// pending deliveries cancelled. Idempotent.
    pub fn deregister(&self, session_id: SessionId) {
        let mut inner = self.inner.write().expect("hub lock poisoned");
        remove_session(&mut inner, session_id);
        debug!(%session_id, "session deregistered");
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe a session to a channel. Idempotent: `true` only when the
    /// subscription is new. Subscribing to a channel nothing has published
    /// to yet is always legal.
    pub fn subscribe(&self, session_id: SessionId, channel: &ChannelKey) -> bool {
        let mut inner = self.inner.write().expect("hub lock poisoned");
        let Some(entry) = inner.sessions.get_mut(&session_id) else {
            return false;
        };
        if !entry.channels.insert(channel.clone()) {
            return true; // already subscribed; still a success
        }
        let dedup = self.cfg.dedup;
        inner
            .channels
            .entry(channel.clone())
            .or_default()
            .insert(session_id, ChannelSub { seen: RecentIds::new(dedup) });
        true
    }

    /// Unsubscribe; a channel the session never subscribed to is a no-op.
    pub fn unsubscribe(&self, session_id: SessionId, channel: &ChannelKey) {
        let mut inner = self.inner.write().expect("hub lock poisoned");
        if let Some(entry) = inner.sessions.get_mut(&session_id) {
            entry.channels.remove(channel);
        }
        prune_channel_member(&mut inner, channel, session_id);
    }

    pub fn is_subscribed(&self, session_id: SessionId, channel: &ChannelKey) -> bool {
        let inner = self.inner.read().expect("hub lock poisoned");
        inner
            .sessions
            .get(&session_id)
            .map(|e| e.channels.contains(channel))
            .unwrap_or(false)
    }

    // -----------------------------------------------------------------------
    // Publish
    // -----------------------------------------------------------------------

    /// Deliver `notification` to every session currently subscribed to
    /// `channel`. Sessions subscribing after this returns never receive it
    /// retroactively.
    ///
    /// The subscriber walk, dedup bookkeeping, mailbox append, and queue
    /// push all happen inside one write-lock critical section, so
    /// sequential publishes by one publisher are observed in publish order
    /// by subscribers that stay connected.
    pub fn publish(&self, channel: &ChannelKey, notification: &Notification) -> PublishReport {
        let now = Instant::now();
        let mut report = PublishReport::default();
        let mut dead: Vec<SessionId> = Vec::new();
        let mut full: Vec<SessionId> = Vec::new();

        {
            let mut inner = self.inner.write().expect("hub lock poisoned");
            let HubInner { sessions, channels } = &mut *inner;
            let Some(subs) = channels.get_mut(channel) else {
                return report;
            };

            for (sid, sub) in subs.iter_mut() {
                let Some(entry) = sessions.get_mut(sid) else {
                    // Registry invariant broken only by a stale channel row;
                    // collect it for removal.
                    dead.push(*sid);
                    continue;
                };
                if sub.seen.contains(&notification.id, now) {
                    report.deduped += 1;
                    continue;
                }
                match entry.tx.try_send(ServerEvent::Notification {
                    notification: notification.clone(),
                }) {
                    Ok(()) => {
                        sub.seen.insert(notification.id, now);
                        entry.mailbox.push(MailboxEntry {
                            notification: notification.clone(),
                            read: false,
                        });
                        report.delivered += 1;
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        report.dropped += 1;
                        full.push(*sid);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        report.dropped += 1;
                        dead.push(*sid);
                    }
                }
            }

            // Bounded delivery: a slow consumer loses this channel, a dead
            // one is forgotten entirely. The publish itself never fails.
            for sid in &full {
                if let Some(entry) = sessions.get_mut(sid) {
                    entry.channels.remove(channel);
                }
                if let Some(subs) = channels.get_mut(channel) {
                    subs.remove(sid);
                }
                warn!(session_id = %sid, channel = %channel, "outbound queue full; dropped from channel");
            }
            for sid in &dead {
                remove_session(&mut inner, *sid);
                prune_channel_member(&mut inner, channel, *sid);
                warn!(session_id = %sid, channel = %channel, "outbound queue closed; session forgotten");
            }
            let now_empty = inner
                .channels
                .get(channel)
                .map(|subs| subs.is_empty())
                .unwrap_or(false);
            if now_empty {
                inner.channels.remove(channel);
            }
        }

        report
    }

    /// Push a non-notification event to every subscriber of `channel`
    /// except `exclude`. No mailbox entry, no dedup: transient traffic such
    /// as typing indicators. Returns the number of queues pushed.
    pub fn send_transient(
        &self,
        channel: &ChannelKey,
        event: &ServerEvent,
        exclude: Option<SessionId>,
    ) -> usize {
        let inner = self.inner.read().expect("hub lock poisoned");
        let Some(subs) = inner.channels.get(channel) else {
            return 0;
        };
        let mut sent = 0;
        for sid in subs.keys() {
            if Some(*sid) == exclude {
                continue;
            }
            if let Some(entry) = inner.sessions.get(sid) {
                if entry.tx.try_send(event.clone()).is_ok() {
                    sent += 1;
                }
            }
        }
        sent
    }

    /// Push one event directly to a single session (transient, best-effort).
    pub fn send_to_session(&self, session_id: SessionId, event: ServerEvent) -> bool {
        let inner = self.inner.read().expect("hub lock poisoned");
        inner
            .sessions
            .get(&session_id)
            .map(|e| e.tx.try_send(event).is_ok())
            .unwrap_or(false)
    }

    // -----------------------------------------------------------------------
    // Mailbox
    // -----------------------------------------------------------------------

    pub fn unread_count(&self, session_id: SessionId) -> usize {
        let inner = self.inner.read().expect("hub lock poisoned");
        inner
            .sessions
            .get(&session_id)
            .map(|e| e.mailbox.iter().filter(|m| !m.read).count())
            .unwrap_or(0)
    }

    /// Mark one mailbox entry read. `true` if an unread entry with this id
    /// existed. Repeating the call is a no-op.
    pub fn mark_read(&self, session_id: SessionId, notification_id: Uuid) -> bool {
        let mut inner = self.inner.write().expect("hub lock poisoned");
        let Some(entry) = inner.sessions.get_mut(&session_id) else {
            return false;
        };
        let mut changed = false;
        for m in entry.mailbox.iter_mut() {
            if m.notification.id == notification_id && !m.read {
                m.read = true;
                changed = true;
            }
        }
        changed
    }

    /// Mark every mailbox entry read; returns how many were newly cleared.
    /// Idempotent: a second call returns 0.
    pub fn mark_all_read(&self, session_id: SessionId) -> usize {
        let mut inner = self.inner.write().expect("hub lock poisoned");
        let Some(entry) = inner.sessions.get_mut(&session_id) else {
            return 0;
        };
        let mut cleared = 0;
        for m in entry.mailbox.iter_mut() {
            if !m.read {
                m.read = true;
                cleared += 1;
            }
        }
        cleared
    }

    pub fn mailbox(&self, session_id: SessionId) -> Vec<MailboxEntry> {
        let inner = self.inner.read().expect("hub lock poisoned");
        inner
            .sessions
            .get(&session_id)
            .map(|e| e.mailbox.clone())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn session_count(&self) -> usize {
        self.inner.read().expect("hub lock poisoned").sessions.len()
    }

    pub fn channel_count(&self) -> usize {
        self.inner.read().expect("hub lock poisoned").channels.len()
    }

    pub fn subscriber_count(&self, channel: &ChannelKey) -> usize {
        let inner = self.inner.read().expect("hub lock poisoned");
        inner.channels.get(channel).map(|s| s.len()).unwrap_or(0)
    }

    pub fn sessions(&self) -> Vec<SessionInfo> {
        let inner = self.inner.read().expect("hub lock poisoned");
        inner
            .sessions
            .iter()
            .map(|(sid, e)| SessionInfo {
                session_id: *sid,
                recipient_id: e.recipient_id.clone(),
                subscribed_channels: e.channels.iter().cloned().collect(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn remove_session(inner: &mut HubInner, session_id: SessionId) {
    if let Some(entry) = inner.sessions.remove(&session_id) {
        for channel in entry.channels {
            prune_channel_member(inner, &channel, session_id);
        }
    }
}

fn prune_channel_member(inner: &mut HubInner, channel: &ChannelKey, session_id: SessionId) {
    let now_empty = match inner.channels.get_mut(channel) {
        Some(subs) => {
            subs.remove(&session_id);
            subs.is_empty()
        }
        None => false,
    };
    if now_empty {
        inner.channels.remove(channel);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
