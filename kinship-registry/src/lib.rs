//! Kinship Registry SDK
//!
//! Client-side coordination of confidential match-score records held on a
//! public ledger in encrypted form. A record's score is homomorphically
//! encrypted before submission and stored on-chain as a ciphertext handle;
//! later, a proof-carrying decryption round trip converts the private
//! ciphertext into a publicly attested plaintext, exactly once per record.
//!
//! # Architecture
//!
//! - [`CipherService`]: encryption and decryption-proof capability, behind
//!   a trait (HTTP relayer in production, [`MockCipher`] in tests)
//! - [`LedgerRead`] / [`LedgerWrite`]: the ledger gateway's two paths,
//!   implemented by `kinship_ledger_client::LedgerClient` over HTTP and by
//!   [`MockLedger`] in tests
//! - [`RecordRepository`]: copy-on-reload snapshot cache of all records
//! - [`Orchestrator`]: the record lifecycle state machine (submit, verify,
//!   short-circuit, race absorption, session events)
//! - [`StatusReporter`]: transient progress/success/error notices
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kinship_registry::{
//!     Orchestrator, RecordRepository, NewRecord, Category, SessionEvent,
//!     cipher::{RelayerClient, RelayerConfig},
//! };
//! use kinship_ledger_client::{LedgerClient, GatewayConfig};
//!
//! let gateway = Arc::new(LedgerClient::new(GatewayConfig {
//!     base_url: "http://localhost:8545".into(),
//!     contract_address: "0x51a9...".into(),
//!     ..Default::default()
//! }));
//! let cipher = Arc::new(RelayerClient::new(RelayerConfig::default()));
//! let repository = Arc::new(RecordRepository::new(gateway.clone()));
//!
//! let orchestrator = Orchestrator::new(
//!     "0x51a9...", cipher, gateway.clone(), gateway, repository,
//! );
//!
//! orchestrator.handle_session_event(SessionEvent::Established {
//!     address: "0xabcd...".into(),
//! }).await;
//!
//! let id = orchestrator.submit(NewRecord {
//!     label: "Jane".into(),
//!     score: 87,
//!     category: Category::Sibling,
//!     public_score: 62,
//! }).await?;
//!
//! let score = orchestrator.verify(&id).await?;
//! ```

// Cipher service seam and implementations
pub mod cipher;

// Ledger gateway seam and implementations
pub mod ledger;

// Core domain types
pub mod types;

// Record snapshot cache
pub mod repository;

// Verification orchestration
pub mod orchestrator;

// Transient status notices
pub mod status;

// Error types
pub mod error;

// Re-export core types
pub use cipher::{CipherService, DecryptionProof, EncryptedInput, MockCipher};
pub use error::{RegistryError, Result};
pub use ledger::{LedgerRead, LedgerWrite, MockLedger, NewRecordTx};
pub use orchestrator::Orchestrator;
pub use repository::{RecordFilter, RecordRepository, RepositoryStats, StatusFilter};
pub use status::{StatusKind, StatusNotice, StatusReporter};
pub use types::{
    Category, CiphertextHandle, NewRecord, Record, RecordId, SessionEvent, MAX_SCORE,
};

// Re-export from the gateway client crate
pub use kinship_ledger_client::{GatewayConfig, LedgerClient, PendingTx, TxReceipt};
