//! Record lifecycle integration tests
//!
//! Drives the orchestrator against the mock cipher and mock ledger:
//! - submission atomicity and validation
//! - decryption-verification happy path and invariants
//! - at-most-once verification: short-circuit, races, concurrent actors
//! - status notices for rejection and success outcomes

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kinship_registry::{
    Category, CiphertextHandle, CipherService, DecryptionProof, EncryptedInput, LedgerRead,
    MockCipher, MockLedger, NewRecord, Orchestrator, Record, RecordId, RecordRepository,
    RegistryError, Result, SessionEvent, StatusKind, StatusReporter,
};

fn slow_dismiss_reporter() -> StatusReporter {
    // Keep notices visible long enough to assert on them
    StatusReporter::with_dismiss(Duration::from_secs(60), Duration::from_secs(60))
}

fn orchestrator_over(
    cipher: Arc<MockCipher>,
    ledger: Arc<MockLedger>,
) -> Orchestrator {
    let repository = Arc::new(RecordRepository::new(ledger.clone()));
    Orchestrator::new("0xfeed", cipher, ledger.clone(), ledger, repository)
        .with_status_reporter(slow_dismiss_reporter())
}

fn setup() -> (Arc<MockCipher>, Arc<MockLedger>, Orchestrator) {
    let cipher = Arc::new(MockCipher::new());
    let ledger = Arc::new(MockLedger::new());
    let orchestrator = orchestrator_over(cipher.clone(), ledger.clone());
    (cipher, ledger, orchestrator)
}

async fn connect(orchestrator: &Orchestrator) {
    orchestrator
        .handle_session_event(SessionEvent::Established {
            address: "0xabcd".into(),
        })
        .await;
}

fn jane() -> NewRecord {
    NewRecord {
        label: "Jane".into(),
        score: 87,
        category: Category::Sibling,
        public_score: 62,
    }
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_submit_creates_encrypted_record() {
    let (_cipher, _ledger, orchestrator) = setup();
    connect(&orchestrator).await;

    let id = orchestrator.submit(jane()).await.unwrap();

    let record = orchestrator.repository().get(&id).await.unwrap();
    assert_eq!(record.label, "Jane");
    assert_eq!(record.category, Some(Category::Sibling));
    assert!(!record.is_verified);
    assert_eq!(record.verified_value, None);
    assert!(!record.ciphertext_handle.as_str().is_empty());
    // The coarse score is a separate field, not the confidential value
    assert_eq!(record.public_score, 62);
}

#[tokio::test]
async fn test_user_rejection_leaves_repository_unchanged() {
    let cipher = Arc::new(MockCipher::new());
    let ledger = Arc::new(MockLedger::new().with_rejecting_signer());
    let orchestrator = orchestrator_over(cipher, ledger.clone());
    connect(&orchestrator).await;

    let err = orchestrator.submit(jane()).await.unwrap_err();
    assert!(matches!(err, RegistryError::UserRejected));

    // Rejection-specific notice, distinct from transport failures
    let notice = orchestrator.status().current().unwrap();
    assert_eq!(notice.kind, StatusKind::Error);
    assert_eq!(notice.message, "Transaction rejected by user");

    assert_eq!(ledger.create_writes(), 0);
    assert!(orchestrator.repository().records().await.is_empty());
}

#[tokio::test]
async fn test_cipher_failure_leaves_no_partial_record() {
    let cipher = Arc::new(MockCipher::new().with_failing_encrypt());
    let ledger = Arc::new(MockLedger::new());
    let orchestrator = orchestrator_over(cipher, ledger.clone());
    connect(&orchestrator).await;

    let err = orchestrator.submit(jane()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Cipher(_)));
    assert_eq!(ledger.create_writes(), 0);
}

// =============================================================================
// Verification
// =============================================================================

#[tokio::test]
async fn test_verify_attests_the_submitted_score() {
    let (cipher, ledger, orchestrator) = setup();
    connect(&orchestrator).await;

    let id = orchestrator.submit(jane()).await.unwrap();
    let value = orchestrator.verify(&id).await.unwrap();
    assert_eq!(value, Some(87));

    assert_eq!(cipher.decrypt_calls(), 1);
    assert_eq!(ledger.verification_writes(), 1);

    let record = orchestrator.repository().get(&id).await.unwrap();
    assert!(record.is_verified);
    assert_eq!(record.verified_value, Some(87));
}

#[tokio::test]
async fn test_verified_iff_value_present_across_lifecycle() {
    let (_cipher, _ledger, orchestrator) = setup();
    connect(&orchestrator).await;

    let id = orchestrator.submit(jane()).await.unwrap();
    let mut second = jane();
    second.label = "June".into();
    second.score = 45;
    orchestrator.submit(second).await.unwrap();

    orchestrator.verify(&id).await.unwrap();

    for record in orchestrator.repository().records().await.iter() {
        assert_eq!(record.is_verified, record.verified_value.is_some());
    }
}

#[tokio::test]
async fn test_second_verify_short_circuits_without_decrypting() {
    let (cipher, ledger, orchestrator) = setup();
    connect(&orchestrator).await;

    let id = orchestrator.submit(jane()).await.unwrap();
    assert_eq!(orchestrator.verify(&id).await.unwrap(), Some(87));
    assert_eq!(cipher.decrypt_calls(), 1);

    // Short-circuit: the already-attested value comes back with no new
    // decryption request and no new ledger write
    assert_eq!(orchestrator.verify(&id).await.unwrap(), Some(87));
    assert_eq!(cipher.decrypt_calls(), 1);
    assert_eq!(ledger.verification_writes(), 1);

    let notice = orchestrator.status().current().unwrap();
    assert_eq!(notice.kind, StatusKind::Success);
}

#[tokio::test]
async fn test_concurrent_actors_produce_exactly_one_verification_write() {
    let cipher_a = Arc::new(MockCipher::new());
    let cipher_b = Arc::new(MockCipher::new());
    let ledger = Arc::new(MockLedger::new());

    // Two independent clients racing on the same ledger
    let actor_a = Arc::new(orchestrator_over(cipher_a, ledger.clone()));
    let actor_b = Arc::new(orchestrator_over(cipher_b, ledger.clone()));
    connect(&actor_a).await;
    connect(&actor_b).await;

    let id = actor_a.submit(jane()).await.unwrap();

    let (a, b) = tokio::join!(actor_a.verify(&id), actor_b.verify(&id));
    assert_eq!(a.unwrap(), Some(87));
    assert_eq!(b.unwrap(), Some(87));

    assert_eq!(ledger.verification_writes(), 1);
}

/// Cipher wrapper whose decryption proofs carry no clear values,
/// simulating a service that attests without disclosing plaintexts.
struct WithholdingCipher {
    inner: MockCipher,
}

#[async_trait]
impl CipherService for WithholdingCipher {
    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn encrypt(&self, contract: &str, caller: &str, value: u64) -> Result<EncryptedInput> {
        self.inner.encrypt(contract, caller, value).await
    }

    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        contract: &str,
    ) -> Result<DecryptionProof> {
        let mut proof = self.inner.request_decryption_proof(handles, contract).await?;
        proof.clear_values.clear();
        Ok(proof)
    }
}

#[tokio::test]
async fn test_proof_without_clear_value_fails_before_any_write() {
    let cipher = Arc::new(WithholdingCipher {
        inner: MockCipher::new(),
    });
    let ledger = Arc::new(MockLedger::new());
    let repository = Arc::new(RecordRepository::new(ledger.clone()));
    let orchestrator = Orchestrator::new("0xfeed", cipher, ledger.clone(), ledger.clone(), repository)
        .with_status_reporter(slow_dismiss_reporter());
    connect(&orchestrator).await;

    let id = orchestrator.submit(jane()).await.unwrap();

    // An unusable proof must be rejected before the attestation is
    // submitted, never after the ledger has committed it
    let err = orchestrator.verify(&id).await.unwrap_err();
    assert!(matches!(err, RegistryError::Cipher(_)));
    assert_eq!(ledger.verification_writes(), 0);

    let record = orchestrator.repository().get(&id).await.unwrap();
    assert!(!record.is_verified);
}

#[tokio::test]
async fn test_verify_unknown_record() {
    let (_cipher, _ledger, orchestrator) = setup();
    connect(&orchestrator).await;

    let err = orchestrator
        .verify(&RecordId::from("match-nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
}

// =============================================================================
// Race absorption
// =============================================================================

/// Read-path wrapper that verifies the record out-of-band during the
/// handle fetch, simulating another actor winning the race between the
/// orchestrator's freshness check and its attestation submission.
struct RacingLedger {
    inner: Arc<MockLedger>,
    race_value: u64,
}

#[async_trait]
impl LedgerRead for RacingLedger {
    async fn list_record_ids(&self) -> Result<Vec<RecordId>> {
        self.inner.list_record_ids().await
    }

    async fn get_record(&self, id: &RecordId) -> Result<Record> {
        self.inner.get_record(id).await
    }

    async fn get_ciphertext_handle(&self, id: &RecordId) -> Result<CiphertextHandle> {
        let handle = self.inner.get_ciphertext_handle(id).await?;
        self.inner.force_verify(id, self.race_value).await;
        Ok(handle)
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn test_lost_race_is_absorbed_as_benign_success() {
    let cipher = Arc::new(MockCipher::new());
    let ledger = Arc::new(MockLedger::new());
    let racing = Arc::new(RacingLedger {
        inner: ledger.clone(),
        race_value: 87,
    });

    let repository = Arc::new(RecordRepository::new(racing.clone()));
    let orchestrator = Orchestrator::new(
        "0xfeed",
        cipher.clone(),
        racing,
        ledger.clone(),
        repository,
    )
    .with_status_reporter(slow_dismiss_reporter());
    connect(&orchestrator).await;

    let id = orchestrator.submit(jane()).await.unwrap();

    // The attestation write loses: its confirmation fails with the
    // already-verified condition, which must surface as success
    let value = orchestrator.verify(&id).await.unwrap();
    assert_eq!(value, Some(87));
    assert_eq!(ledger.verification_writes(), 0);

    let notice = orchestrator.status().current().unwrap();
    assert_eq!(notice.kind, StatusKind::Success);

    let record = orchestrator.repository().get(&id).await.unwrap();
    assert!(record.is_verified);
}

/// Read-path wrapper that both wins the race out-of-band and then reports
/// the verified record without its attested value, violating the
/// verified-implies-value invariant.
struct ValuelessRacingLedger {
    inner: Arc<MockLedger>,
}

#[async_trait]
impl LedgerRead for ValuelessRacingLedger {
    async fn list_record_ids(&self) -> Result<Vec<RecordId>> {
        self.inner.list_record_ids().await
    }

    async fn get_record(&self, id: &RecordId) -> Result<Record> {
        let mut record = self.inner.get_record(id).await?;
        record.verified_value = None;
        Ok(record)
    }

    async fn get_ciphertext_handle(&self, id: &RecordId) -> Result<CiphertextHandle> {
        let handle = self.inner.get_ciphertext_handle(id).await?;
        self.inner.force_verify(id, 87).await;
        Ok(handle)
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn test_race_absorption_rejects_verified_record_without_value() {
    let cipher = Arc::new(MockCipher::new());
    let ledger = Arc::new(MockLedger::new());
    let racing = Arc::new(ValuelessRacingLedger {
        inner: ledger.clone(),
    });

    let repository = Arc::new(RecordRepository::new(racing.clone()));
    let orchestrator = Orchestrator::new("0xfeed", cipher, racing, ledger.clone(), repository)
        .with_status_reporter(slow_dismiss_reporter());
    connect(&orchestrator).await;

    let id = orchestrator.submit(jane()).await.unwrap();

    // A verified record with no attested value is a ledger-integrity
    // failure, never a silent empty success
    let err = orchestrator.verify(&id).await.unwrap_err();
    assert!(matches!(err, RegistryError::Ledger(_)));
}

// =============================================================================
// Repository partial availability
// =============================================================================

#[tokio::test]
async fn test_reload_with_one_failing_fetch_returns_the_rest() {
    let (_cipher, ledger, orchestrator) = setup();
    connect(&orchestrator).await;

    let first = orchestrator.submit(jane()).await.unwrap();
    let mut second = jane();
    second.label = "June".into();
    let second = orchestrator.submit(second).await.unwrap();
    let mut third = jane();
    third.label = "Jon".into();
    let third = orchestrator.submit(third).await.unwrap();

    ledger.fail_detail_for(&second).await;
    assert_eq!(orchestrator.refresh().await.unwrap(), 2);

    let repository = orchestrator.repository();
    assert!(repository.get(&first).await.is_some());
    assert!(repository.get(&second).await.is_none());
    assert!(repository.get(&third).await.is_some());
}
