//! Storage port for receipts. Implementations must be linearizable per
//! (artifact, recipient) key; `ldk-store` ships the in-memory one.

use anyhow::Result;
use async_trait::async_trait;

use crate::DeliveryReceipt;

#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn load_receipt(
        &self,
        artifact_id: &str,
        recipient_id: &str,
    ) -> Result<Option<DeliveryReceipt>>;

    async fn save_receipt(&self, receipt: &DeliveryReceipt) -> Result<()>;
}
