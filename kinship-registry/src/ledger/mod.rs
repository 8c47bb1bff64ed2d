//! Ledger gateway seam
//!
//! Read and write paths are separate traits because they carry different
//! obligations: reads need no signature and may be served by any indexer,
//! while writes go through the caller's signer and resolve in two stages
//! (submission, then confirmation via [`PendingTx`]).

use async_trait::async_trait;
use kinship_ledger_client::PendingTx;

use crate::error::Result;
use crate::types::{Category, CiphertextHandle, Record, RecordId};

mod http;
mod mock;

pub use mock::MockLedger;

/// A fully assembled record-creation write
#[derive(Debug, Clone)]
pub struct NewRecordTx {
    /// Caller-assigned record id
    pub id: RecordId,
    /// Display label
    pub label: String,
    /// Ciphertext of the confidential value
    pub ciphertext: Vec<u8>,
    /// Input-validity proof for the ciphertext
    pub proof: Vec<u8>,
    /// Plaintext coarse score in [0,100]
    pub public_score: u8,
    /// Relationship category
    pub category: Category,
}

/// Ledger read path (no signature required)
#[async_trait]
pub trait LedgerRead: Send + Sync {
    /// List all record ids, in ledger enumeration order
    async fn list_record_ids(&self) -> Result<Vec<RecordId>>;

    /// Fetch one record's stored state
    async fn get_record(&self, id: &RecordId) -> Result<Record>;

    /// Fetch the ciphertext handle for a record's confidential value
    async fn get_ciphertext_handle(&self, id: &RecordId) -> Result<CiphertextHandle>;

    /// Check whether the registry contract is reachable and serving
    async fn health_check(&self) -> Result<bool>;
}

/// Ledger write path (requires signature)
#[async_trait]
pub trait LedgerWrite: Send + Sync {
    /// Submit a new record with its committed ciphertext
    ///
    /// Atomic: either the record exists with its ciphertext or it does
    /// not exist at all.
    async fn create_record(&self, tx: NewRecordTx) -> Result<PendingTx>;

    /// Submit a decryption attestation for a record
    ///
    /// The ledger accepts exactly one verification per record; a second
    /// attempt fails with an already-verified condition, either at
    /// submission or at confirmation depending on when the race is lost.
    async fn submit_verification(
        &self,
        id: &RecordId,
        encoded_plain: &[u8],
        proof: &[u8],
    ) -> Result<PendingTx>;
}
