//! Bounded recently-seen id set for per-(session, channel) dedup.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use uuid::Uuid;

// ---------------------------------------------------------------------------
// DedupConfig
// ---------------------------------------------------------------------------

/// Bounds for one recently-seen set. Entries are discarded once older than
/// `retention` or once the set exceeds `capacity`, oldest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DedupConfig {
    pub capacity: usize,
    pub retention: Duration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            retention: Duration::from_secs(300),
        }
    }
}

// ---------------------------------------------------------------------------
// RecentIds
// ---------------------------------------------------------------------------

/// Capped, age-bounded set of notification ids already delivered on one
/// (session, channel) pair.
///
/// Time is passed in by the caller so the eviction rules stay deterministic
/// under test.
#[derive(Debug)]
pub struct RecentIds {
    cfg: DedupConfig,
    order: VecDeque<(Instant, Uuid)>,
    seen: HashSet<Uuid>,
}

impl RecentIds {
    pub fn new(cfg: DedupConfig) -> Self {
        Self {
            cfg,
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// `true` if `id` was delivered within the retention window.
    pub fn contains(&mut self, id: &Uuid, now: Instant) -> bool {
        self.prune(now);
        self.seen.contains(id)
    }

    /// Record a delivery. Evicts the oldest entry when over capacity.
    pub fn insert(&mut self, id: Uuid, now: Instant) {
        self.prune(now);
        if self.seen.insert(id) {
            self.order.push_back((now, id));
            while self.order.len() > self.cfg.capacity {
                if let Some((_, evicted)) = self.order.pop_front() {
                    self.seen.remove(&evicted);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn prune(&mut self, now: Instant) {
        while let Some((ts, id)) = self.order.front().copied() {
            if now.duration_since(ts) <= self.cfg.retention {
                break;
            }
            self.order.pop_front();
            self.seen.remove(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
