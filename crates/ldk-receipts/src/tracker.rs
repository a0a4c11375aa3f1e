//! Acknowledgment tracker: monotone receipt upgrades.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use ldk_hub::NotificationHub;
use ldk_schemas::{ChannelKey, Notification, ReceiptAction};

use crate::{DeliveryReceipt, ReceiptStatus, ReceiptStore, RecordOutcome};

// ---------------------------------------------------------------------------
// RecordError
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum RecordError {
    Storage(String),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for RecordError {}

// ---------------------------------------------------------------------------
// AcknowledgmentTracker
// ---------------------------------------------------------------------------

/// Owns the per-(artifact, recipient) maturity map.
///
/// `record` runs load-compare-save under that key's own async mutex, so
/// concurrent or repeated acknowledgments can only move maturity up. A
/// stale action is a silent no-op rather than an error: retried deliveries
/// re-send acknowledgments freely.
pub struct AcknowledgmentTracker {
    store: Arc<dyn ReceiptStore>,
    hub: Arc<NotificationHub>,
    locks: Mutex<HashMap<(String, String), Arc<AsyncMutex<()>>>>,
}

impl AcknowledgmentTracker {
    pub fn new(store: Arc<dyn ReceiptStore>, hub: Arc<NotificationHub>) -> Self {
        Self {
            store,
            hub,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Record `action` for `(artifact_id, recipient_id)`.
    ///
    /// On an actual upgrade a `report_acknowledged` notification goes out
    /// on `reports:{artifact_id}`. Equal or lower actions change nothing
    /// and emit nothing.
    pub async fn record(
        &self,
        artifact_id: &str,
        recipient_id: &str,
        action: ReceiptAction,
    ) -> Result<RecordOutcome, RecordError> {
        let guard = self.lock_for(artifact_id, recipient_id);
        let _held = guard.lock().await;

        let current = self.status_for(artifact_id, recipient_id).await?;
        if ReceiptStatus::Recorded(action) <= current {
            debug!(artifact_id, recipient_id, %action, "stale acknowledgment ignored");
            return Ok(RecordOutcome::Stale);
        }

        let receipt = DeliveryReceipt::new(artifact_id, recipient_id, action);
        self.store
            .save_receipt(&receipt)
            .await
            .map_err(|e| RecordError::Storage(e.to_string()))?;

        info!(artifact_id, recipient_id, %action, "receipt upgraded");
        let notification = Notification::report_acknowledged(artifact_id, recipient_id, action);
        let _ = self
            .hub
            .publish(&ChannelKey::report(artifact_id), &notification);

        Ok(RecordOutcome::Upgraded {
            previous: current,
            action,
        })
    }

    /// Current maturity, `Unsent` when no receipt exists. Monotonically
    /// non-decreasing over any interleaving of `record` calls.
    pub async fn status_for(
        &self,
        artifact_id: &str,
        recipient_id: &str,
    ) -> Result<ReceiptStatus, RecordError> {
        let receipt = self
            .store
            .load_receipt(artifact_id, recipient_id)
            .await
            .map_err(|e| RecordError::Storage(e.to_string()))?;
        Ok(match receipt {
            None => ReceiptStatus::Unsent,
            Some(r) => ReceiptStatus::Recorded(r.action),
        })
    }

    fn lock_for(&self, artifact_id: &str, recipient_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("receipt lock map poisoned");
        Arc::clone(
            locks
                .entry((artifact_id.to_string(), recipient_id.to_string()))
                .or_default(),
        )
    }
}
