//! Per-recipient delivery receipts for report artifacts.
//!
//! A receipt records how far one recipient has progressed toward consuming
//! one artifact (sent < delivered < viewed < downloaded). Maturity never
//! decreases; repeating or reordering acknowledgments is safe by design so
//! network retries cost nothing.

mod receipt;
mod store;
mod tracker;

pub use receipt::{DeliveryReceipt, ReceiptStatus, RecordOutcome};
pub use store::ReceiptStore;
pub use tracker::{AcknowledgmentTracker, RecordError};
