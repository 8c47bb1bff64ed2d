//! Error types for the ledger gateway client

use thiserror::Error;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Ledger gateway error types
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Record not found on the ledger
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The signer declined to sign the transaction
    #[error("Transaction rejected by user")]
    UserRejected,

    /// Transaction was mined but reverted on-chain
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// The record has already been verified; the ledger accepts exactly
    /// one verification per record
    #[error("Record already verified: {0}")]
    AlreadyVerified(String),

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Gateway returned a malformed or unexpected payload
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        LedgerError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Protocol(err.to_string())
    }
}
