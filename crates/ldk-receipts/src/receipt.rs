//! Receipt data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ldk_schemas::ReceiptAction;

/// Latest acknowledgment of one artifact by one recipient. Only the most
/// mature action is retained; receipts are never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub artifact_id: String,
    pub recipient_id: String,
    pub action: ReceiptAction,
    pub acted_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn new(
        artifact_id: impl Into<String>,
        recipient_id: impl Into<String>,
        action: ReceiptAction,
    ) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            recipient_id: recipient_id.into(),
            action,
            acted_at: Utc::now(),
        }
    }
}

/// Answer to a status query. Derive order makes `Unsent` the least mature,
/// so the whole type is comparable along the maturity axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Unsent,
    Recorded(ReceiptAction),
}

impl ReceiptStatus {
    pub fn action(&self) -> Option<ReceiptAction> {
        match self {
            ReceiptStatus::Unsent => None,
            ReceiptStatus::Recorded(a) => Some(*a),
        }
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiptStatus::Unsent => f.write_str("unsent"),
            ReceiptStatus::Recorded(a) => a.fmt(f),
        }
    }
}

/// What a `record` call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Maturity moved up; a `report_acknowledged` notification was emitted.
    Upgraded {
        previous: ReceiptStatus,
        action: ReceiptAction,
    },
    /// Action at or below current maturity: silent no-op, not an error.
    /// Tolerates retries and out-of-order acknowledgments.
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsent_is_least_mature() {
        assert!(ReceiptStatus::Unsent < ReceiptStatus::Recorded(ReceiptAction::Sent));
        assert!(
            ReceiptStatus::Recorded(ReceiptAction::Sent)
                < ReceiptStatus::Recorded(ReceiptAction::Downloaded)
        );
    }

    #[test]
    fn status_display_matches_wire_names() {
        assert_eq!(ReceiptStatus::Unsent.to_string(), "unsent");
        assert_eq!(
            ReceiptStatus::Recorded(ReceiptAction::Viewed).to_string(),
            "viewed"
        );
    }
}
