//! Mock ledger for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use kinship_ledger_client::{LedgerError, PendingTx, TxReceipt};
use tokio::sync::RwLock;

use super::{LedgerRead, LedgerWrite, NewRecordTx};
use crate::cipher::MockCipher;
use crate::error::{RegistryError, Result};
use crate::types::{CiphertextHandle, Record, RecordId};

#[derive(Default)]
struct Inner {
    /// Enumeration order, as a real contract would iterate its id array
    order: Vec<String>,
    records: HashMap<String, Record>,
    /// Ids whose detail fetch fails (partial-read fault injection)
    failing_details: HashSet<String>,
}

/// In-memory ledger for testing.
///
/// Enforces the contract's semantics: record creation is atomic, and each
/// record accepts exactly one verification. Handles are derived from the
/// ciphertext the same way [`MockCipher`] expects, so the two doubles
/// compose without shared state.
pub struct MockLedger {
    inner: RwLock<Inner>,
    signer_address: String,
    available: AtomicBool,
    reject_signatures: AtomicBool,
    create_writes: AtomicU32,
    verification_writes: AtomicU32,
    next_block: AtomicU64,
}

impl MockLedger {
    /// Create an empty mock ledger
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            signer_address: "0xmock-signer".to_string(),
            available: AtomicBool::new(true),
            reject_signatures: AtomicBool::new(false),
            create_writes: AtomicU32::new(0),
            verification_writes: AtomicU32::new(0),
            next_block: AtomicU64::new(1),
        }
    }

    /// Set the address writes are attributed to
    pub fn with_signer(mut self, address: impl Into<String>) -> Self {
        self.signer_address = address.into();
        self
    }

    /// Make the health check report unavailable
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Make every signature prompt answer "rejected"
    pub fn with_rejecting_signer(self) -> Self {
        self.reject_signatures.store(true, Ordering::SeqCst);
        self
    }

    /// Seed a record directly, bypassing the write path
    pub async fn seed_record(&self, record: Record) {
        let mut inner = self.inner.write().await;
        let id = record.id.0.clone();
        assert!(
            inner.records.insert(id.clone(), record).is_none(),
            "duplicate record id seeded: {}",
            id
        );
        inner.order.push(id);
    }

    /// Make the detail fetch for one record fail
    pub async fn fail_detail_for(&self, id: &RecordId) {
        self.inner.write().await.failing_details.insert(id.0.clone());
    }

    /// Verify a record out-of-band, simulating a concurrent actor winning
    /// the race between handle fetch and attestation submission
    pub async fn force_verify(&self, id: &RecordId, value: u64) {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(id.as_str())
            .expect("force_verify on unknown record");
        record.is_verified = true;
        record.verified_value = Some(value);
    }

    /// Number of record-creation writes confirmed
    pub fn create_writes(&self) -> u32 {
        self.create_writes.load(Ordering::SeqCst)
    }

    /// Number of verification writes confirmed
    pub fn verification_writes(&self) -> u32 {
        self.verification_writes.load(Ordering::SeqCst)
    }

    fn receipt(&self, tx_hash: String) -> TxReceipt {
        TxReceipt {
            tx_hash,
            block_number: self.next_block.fetch_add(1, Ordering::SeqCst),
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerRead for MockLedger {
    async fn list_record_ids(&self) -> Result<Vec<RecordId>> {
        let inner = self.inner.read().await;
        Ok(inner.order.iter().cloned().map(RecordId).collect())
    }

    async fn get_record(&self, id: &RecordId) -> Result<Record> {
        let inner = self.inner.read().await;
        if inner.failing_details.contains(id.as_str()) {
            return Err(RegistryError::Ledger(format!(
                "detail fetch failed for {}",
                id
            )));
        }
        inner
            .records
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.0.clone()))
    }

    async fn get_ciphertext_handle(&self, id: &RecordId) -> Result<CiphertextHandle> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(id.as_str())
            .map(|r| r.ciphertext_handle.clone())
            .ok_or_else(|| RegistryError::NotFound(id.0.clone()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.available.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl LedgerWrite for MockLedger {
    async fn create_record(&self, tx: NewRecordTx) -> Result<PendingTx> {
        if self.reject_signatures.load(Ordering::SeqCst) {
            return Err(RegistryError::UserRejected);
        }

        let mut inner = self.inner.write().await;
        // Id uniqueness is a precondition, not a runtime condition
        assert!(
            !inner.records.contains_key(tx.id.as_str()),
            "duplicate record id: {}",
            tx.id
        );

        let record = Record {
            id: tx.id.clone(),
            label: tx.label,
            category: Some(tx.category),
            created_at: chrono::Utc::now().timestamp(),
            owner: self.signer_address.clone(),
            public_score: tx.public_score,
            is_verified: false,
            verified_value: None,
            ciphertext_handle: MockCipher::handle_for(&tx.ciphertext),
        };

        inner.order.push(tx.id.0.clone());
        inner.records.insert(tx.id.0.clone(), record);
        self.create_writes.fetch_add(1, Ordering::SeqCst);

        let tx_hash = format!("0xcreate-{}", tx.id);
        let receipt = self.receipt(tx_hash.clone());
        Ok(PendingTx::ready(tx_hash, Ok(receipt)))
    }

    async fn submit_verification(
        &self,
        id: &RecordId,
        encoded_plain: &[u8],
        _proof: &[u8],
    ) -> Result<PendingTx> {
        if self.reject_signatures.load(Ordering::SeqCst) {
            return Err(RegistryError::UserRejected);
        }

        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(id.as_str())
            .ok_or_else(|| RegistryError::NotFound(id.0.clone()))?;

        if record.is_verified {
            // Also exercised via the confirmation stage: real gateways may
            // only learn of the race from the revert reason
            let tx_hash = format!("0xverify-{}", id);
            return Ok(PendingTx::ready(
                tx_hash,
                Err(LedgerError::AlreadyVerified(format!(
                    "Data already verified: {}",
                    id
                ))),
            ));
        }

        let bytes: [u8; 8] = encoded_plain
            .get(..8)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| RegistryError::Ledger("malformed encoded plaintext".into()))?;
        let value = u64::from_be_bytes(bytes);

        record.is_verified = true;
        record.verified_value = Some(value);
        self.verification_writes.fetch_add(1, Ordering::SeqCst);

        let tx_hash = format!("0xverify-{}", id);
        let receipt = self.receipt(tx_hash.clone());
        Ok(PendingTx::ready(tx_hash, Ok(receipt)))
    }
}
