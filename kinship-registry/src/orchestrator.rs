//! Verification orchestrator
//!
//! Drives a single record through encryption-submission and
//! decryption-verification. Each record moves `Encrypted` →
//! `VerificationInFlight` (transient, never persisted) → `Verified`
//! (terminal), or back to `Encrypted` on failure. The ledger is the single
//! source of truth for "has this record been verified": same-record races
//! are resolved by its at-most-once rule, not by client-side locking, and
//! losing that race is a benign outcome, not an error.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use kinship_ledger_client::LedgerError;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cipher::CipherService;
use crate::error::{RegistryError, Result};
use crate::ledger::{LedgerRead, LedgerWrite, NewRecordTx};
use crate::repository::RecordRepository;
use crate::status::StatusReporter;
use crate::types::{NewRecord, RecordId, SessionEvent, MAX_SCORE};

/// Orchestrates the encrypted-record lifecycle against the cipher service
/// and the ledger gateway
pub struct Orchestrator {
    contract_address: String,
    cipher: Arc<dyn CipherService>,
    ledger_read: Arc<dyn LedgerRead>,
    ledger_write: Arc<dyn LedgerWrite>,
    repository: Arc<RecordRepository>,
    status: StatusReporter,
    /// Caller address while a wallet session is active
    session: RwLock<Option<String>>,
    /// Records with an operation in flight; a UX safeguard for disabling
    /// the triggering affordance, not a correctness mechanism
    in_flight: Mutex<HashSet<RecordId>>,
}

impl Orchestrator {
    /// Create an orchestrator over the given capability seams
    pub fn new(
        contract_address: impl Into<String>,
        cipher: Arc<dyn CipherService>,
        ledger_read: Arc<dyn LedgerRead>,
        ledger_write: Arc<dyn LedgerWrite>,
        repository: Arc<RecordRepository>,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            cipher,
            ledger_read,
            ledger_write,
            repository,
            status: StatusReporter::new(),
            session: RwLock::new(None),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Use a custom status reporter (tests shorten its dismiss intervals)
    pub fn with_status_reporter(mut self, status: StatusReporter) -> Self {
        self.status = status;
        self
    }

    /// The status reporter driven by this orchestrator's transitions
    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// The repository this orchestrator refreshes
    pub fn repository(&self) -> &Arc<RecordRepository> {
        &self.repository
    }

    /// Caller address of the active session, if any
    pub async fn session_address(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    /// Whether an operation for this record is currently in flight
    pub fn is_in_flight(&self, id: &RecordId) -> bool {
        self.in_flight.lock().unwrap().contains(id)
    }

    /// React to a session lifecycle event
    ///
    /// Establishing a session loads the repository; losing it clears the
    /// session and drops the cached snapshot.
    pub async fn handle_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Established { address } => {
                info!(%address, "Session established");
                *self.session.write().await = Some(address);
                if let Err(err) = self.repository.reload().await {
                    self.status.error(format!("Failed to load records: {}", err));
                }
            }
            SessionEvent::Lost => {
                info!("Session lost");
                *self.session.write().await = None;
                self.repository.clear().await;
            }
        }
    }

    /// Encrypt a confidential score and submit it as a new record
    ///
    /// The write is atomic: a failure at any step leaves no partial
    /// record. Nothing is retried automatically; the caller re-invokes.
    pub async fn submit(&self, input: NewRecord) -> Result<RecordId> {
        let result = self.submit_inner(input).await;
        if let Err(err) = &result {
            self.report_failure("Submission", err);
        }
        result
    }

    async fn submit_inner(&self, input: NewRecord) -> Result<RecordId> {
        let caller = self
            .session_address()
            .await
            .ok_or(RegistryError::NotConnected)?;

        // Never clamp: an out-of-range score is a caller error, rejected
        // before any encryption or ledger traffic
        if input.score > MAX_SCORE {
            return Err(RegistryError::InvalidScore { value: input.score });
        }
        if u64::from(input.public_score) > MAX_SCORE {
            return Err(RegistryError::InvalidScore {
                value: u64::from(input.public_score),
            });
        }

        if !self.cipher.is_available().await {
            return Err(RegistryError::Cipher("cipher service unavailable".into()));
        }

        self.status.pending("Encrypting match score...");
        let encrypted = self
            .cipher
            .encrypt(&self.contract_address, &caller, input.score)
            .await?;

        let id = RecordId::generate();
        debug!(record_id = %id, "Submitting encrypted record");

        let pending = self
            .ledger_write
            .create_record(NewRecordTx {
                id: id.clone(),
                label: input.label,
                ciphertext: encrypted.ciphertext,
                proof: encrypted.proof,
                public_score: input.public_score,
                category: input.category,
            })
            .await?;

        self.status.pending("Waiting for transaction confirmation...");
        pending.wait().await?;

        self.status.success("Match record created");

        // The record is committed; a reload failure only means a stale cache
        if let Err(err) = self.repository.reload().await {
            warn!(error = %err, "Reload after submission failed");
        }

        Ok(id)
    }

    /// Convert a record's private ciphertext into a publicly attested
    /// plaintext, at most once per record
    ///
    /// Returns the plaintext on success or short-circuit, and `Ok(None)`
    /// when no wallet session is active (a guarded precondition, not a
    /// failure to report loudly).
    pub async fn verify(&self, id: &RecordId) -> Result<Option<u64>> {
        if self.session_address().await.is_none() {
            self.status.error("Please connect a wallet first");
            return Ok(None);
        }

        {
            let mut in_flight = self.in_flight.lock().unwrap();
            if !in_flight.insert(id.clone()) {
                return Err(RegistryError::Busy(id.0.clone()));
            }
        }

        let result = self.verify_inner(id).await;
        self.in_flight.lock().unwrap().remove(id);

        if let Err(err) = &result {
            self.report_failure("Decryption", err);
        }
        result
    }

    async fn verify_inner(&self, id: &RecordId) -> Result<Option<u64>> {
        // Fresh ledger read, not the cached snapshot: the short-circuit
        // must reflect what the ledger believes right now
        let record = self.ledger_read.get_record(id).await?;

        if record.is_verified {
            let value = record.verified_value.ok_or_else(|| {
                RegistryError::Ledger(format!("record {} verified without a value", id))
            })?;
            debug!(record_id = %id, "Already verified, skipping decryption");
            self.status.success("Data already verified on-chain");
            return Ok(Some(value));
        }

        let handle = self.ledger_read.get_ciphertext_handle(id).await?;

        self.status.pending("Requesting decryption proof...");
        let proof = self
            .cipher
            .request_decryption_proof(std::slice::from_ref(&handle), &self.contract_address)
            .await?;

        // Resolve the clear value before the ledger write: once the
        // attestation commits, nothing on this path is allowed to fail
        let value = proof.clear_values.get(&handle).copied().ok_or_else(|| {
            RegistryError::Cipher(format!("decryption result missing handle {}", handle))
        })?;

        let submitted = match self
            .ledger_write
            .submit_verification(id, &proof.encoded_plain, &proof.proof)
            .await
        {
            Ok(pending) => pending,
            Err(RegistryError::AlreadyVerified(_)) => {
                return self.absorb_verified_race(id).await;
            }
            Err(err) => return Err(err),
        };

        self.status.pending("Verifying decryption on-chain...");
        match submitted.wait().await {
            Ok(_receipt) => {}
            Err(LedgerError::AlreadyVerified(_)) => {
                return self.absorb_verified_race(id).await;
            }
            Err(err) => return Err(err.into()),
        }

        if let Err(err) = self.repository.reload().await {
            warn!(error = %err, "Reload after verification failed");
        }
        self.status.success("Match score decrypted and verified");

        Ok(Some(value))
    }

    /// Another actor verified this record between our read and our write.
    /// The ledger already holds the attested plaintext, so reload and
    /// report success rather than surfacing an error.
    async fn absorb_verified_race(&self, id: &RecordId) -> Result<Option<u64>> {
        debug!(record_id = %id, "Lost verification race, treating as already verified");

        if let Err(err) = self.repository.reload().await {
            warn!(error = %err, "Reload after verification race failed");
        }
        self.status.success("Data is already verified on-chain");

        let record = self.ledger_read.get_record(id).await?;
        let value = record.verified_value.ok_or_else(|| {
            RegistryError::Ledger(format!("record {} verified without a value", id))
        })?;
        Ok(Some(value))
    }

    /// Manually rebuild the repository snapshot
    pub async fn refresh(&self) -> Result<usize> {
        match self.repository.reload().await {
            Ok(count) => Ok(count),
            Err(err) => {
                self.status.error(format!("Failed to load records: {}", err));
                Err(err)
            }
        }
    }

    /// Probe the registry contract through the gateway read path
    pub async fn check_availability(&self) -> Result<bool> {
        match self.ledger_read.health_check().await {
            Ok(true) => {
                self.status.success("Registry contract is available and ready");
                Ok(true)
            }
            Ok(false) => {
                self.status.error("Registry contract is not available");
                Ok(false)
            }
            Err(err) => {
                self.status.error("Availability check failed");
                Err(err)
            }
        }
    }

    fn report_failure(&self, action: &str, err: &RegistryError) {
        match err {
            RegistryError::UserRejected => self.status.error("Transaction rejected by user"),
            RegistryError::NotConnected => self.status.error("Please connect a wallet first"),
            _ => self.status.error(format!("{} failed: {}", action, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::MockCipher;
    use crate::ledger::MockLedger;
    use crate::types::Category;

    fn setup() -> (Arc<MockCipher>, Arc<MockLedger>, Orchestrator) {
        let cipher = Arc::new(MockCipher::new());
        let ledger = Arc::new(MockLedger::new());
        let repository = Arc::new(RecordRepository::new(ledger.clone()));
        let orchestrator = Orchestrator::new(
            "0xfeed",
            cipher.clone(),
            ledger.clone(),
            ledger.clone(),
            repository,
        );
        (cipher, ledger, orchestrator)
    }

    async fn connect(orchestrator: &Orchestrator) {
        orchestrator
            .handle_session_event(SessionEvent::Established {
                address: "0xabcd".into(),
            })
            .await;
    }

    fn jane(score: u64) -> NewRecord {
        NewRecord {
            label: "Jane".into(),
            score,
            category: Category::Sibling,
            public_score: 62,
        }
    }

    #[tokio::test]
    async fn test_submit_requires_session() {
        let (cipher, ledger, orchestrator) = setup();

        let err = orchestrator.submit(jane(87)).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotConnected));
        assert_eq!(cipher.encrypt_calls(), 0);
        assert_eq!(ledger.create_writes(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_out_of_range_before_any_io() {
        let (cipher, ledger, orchestrator) = setup();
        connect(&orchestrator).await;

        let err = orchestrator.submit(jane(101)).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidScore { value: 101 }));
        assert_eq!(cipher.encrypt_calls(), 0);
        assert_eq!(ledger.create_writes(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_reported_verbatim() {
        let (_cipher, _ledger, orchestrator) = setup();
        connect(&orchestrator).await;

        let err = orchestrator.submit(jane(u64::MAX)).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidScore { value: u64::MAX }));
        assert!(err.to_string().contains(&u64::MAX.to_string()));
    }

    #[tokio::test]
    async fn test_session_loss_clears_snapshot() {
        let (_cipher, _ledger, orchestrator) = setup();
        connect(&orchestrator).await;

        orchestrator.submit(jane(87)).await.unwrap();
        assert_eq!(orchestrator.repository().records().await.len(), 1);

        orchestrator.handle_session_event(SessionEvent::Lost).await;
        assert!(orchestrator.session_address().await.is_none());
        assert!(orchestrator.repository().records().await.is_empty());
    }

    #[tokio::test]
    async fn test_verify_without_session_is_silent_none() {
        let (_cipher, _ledger, orchestrator) = setup();

        let result = orchestrator.verify(&RecordId::from("match-1")).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_check_availability() {
        let (_cipher, _ledger, orchestrator) = setup();
        assert!(orchestrator.check_availability().await.unwrap());
    }
}
