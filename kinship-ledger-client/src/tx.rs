//! Pending transaction handles
//!
//! A write to the ledger resolves in two stages: submission (signing and
//! broadcast) and confirmation. `PendingTx` represents a submitted write
//! whose confirmation has not yet been awaited, so callers can surface
//! "waiting for confirmation" progress between the two stages.

use futures::future::BoxFuture;

use crate::error::Result;

/// Receipt for a confirmed transaction
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// Hash of the confirmed transaction
    pub tx_hash: String,
    /// Block the transaction was mined in
    pub block_number: u64,
}

/// A submitted but not yet confirmed ledger write
///
/// Dropping a `PendingTx` abandons the wait, not the transaction; the
/// write is already broadcast.
pub struct PendingTx {
    tx_hash: String,
    wait: BoxFuture<'static, Result<TxReceipt>>,
}

impl PendingTx {
    /// Wrap a submitted transaction with its confirmation future
    pub fn new(tx_hash: impl Into<String>, wait: BoxFuture<'static, Result<TxReceipt>>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            wait,
        }
    }

    /// A transaction whose outcome is already known (used by test doubles)
    pub fn ready(tx_hash: impl Into<String>, outcome: Result<TxReceipt>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            wait: Box::pin(async move { outcome }),
        }
    }

    /// Hash of the submitted transaction
    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    /// Await finality, resolving to a receipt or a rejection/revert error
    pub async fn wait(self) -> Result<TxReceipt> {
        self.wait.await
    }
}

impl std::fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTx")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}
