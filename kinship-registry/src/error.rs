//! Error types for the registry SDK

use kinship_ledger_client::LedgerError;
use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Registry error types
///
/// The taxonomy matters to callers: precondition failures and user
/// rejections are never retried, transport failures are retried only by
/// explicit re-invocation, and the already-verified condition is not an
/// error at the orchestrator level at all (it is absorbed there and never
/// escapes to callers of `verify`).
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No active session; the caller's identity is unresolved
    #[error("No wallet session - connect before submitting")]
    NotConnected,

    /// The user declined the signature prompt
    #[error("Transaction rejected by user")]
    UserRejected,

    /// Submitted score is not a valid confidential value
    #[error("Invalid score {value}: must be an integer in [0,100]")]
    InvalidScore { value: u64 },

    /// Record not found in the repository or on the ledger
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The record has already been verified on the ledger
    #[error("Record already verified: {0}")]
    AlreadyVerified(String),

    /// An operation for this record is still in flight
    #[error("Operation already in flight for record {0}")]
    Busy(String),

    /// Cipher service failure (encryption or decryption-proof request)
    #[error("Cipher service error: {0}")]
    Cipher(String),

    /// Ledger transport or protocol failure
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<LedgerError> for RegistryError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserRejected => RegistryError::UserRejected,
            LedgerError::AlreadyVerified(detail) => RegistryError::AlreadyVerified(detail),
            LedgerError::NotFound(id) => RegistryError::NotFound(id),
            other => RegistryError::Ledger(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}
