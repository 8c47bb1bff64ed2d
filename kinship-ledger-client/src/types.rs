//! Types for the ledger gateway API

use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL for the ledger gateway HTTP API
    pub base_url: String,
    /// Address of the registry contract being queried
    pub contract_address: String,
    /// Optional API key for the signing endpoint
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Interval between receipt polls in milliseconds (default: 500)
    pub poll_interval_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8545".to_string(),
            contract_address: String::new(),
            api_key: None,
            timeout_secs: 30,
            poll_interval_ms: 500,
        }
    }
}

/// Record detail as stored on the ledger
///
/// The confidential value never appears here; only its ciphertext handle
/// (fetched separately) and, once verified, the attested plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDetail {
    /// Record ID
    pub id: String,
    /// Display label
    pub label: String,
    /// Integer category code (authoritative representation)
    pub category_code: u8,
    /// Creation timestamp (seconds since epoch), fixed at ledger-write time
    pub created_at: i64,
    /// Address of the creating account
    pub owner: String,
    /// Plaintext coarse score in [0,100]; not the confidential value
    pub public_score: u8,
    /// Whether the confidential value has been publicly attested
    pub is_verified: bool,
    /// The attested plaintext; present iff `is_verified`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_value: Option<u64>,
    /// Opaque reference to the encrypted confidential value
    pub ciphertext_handle: String,
}

/// Response from the list-record-ids endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRecordIdsResponse {
    /// Record IDs in ledger enumeration order
    pub ids: Vec<String>,
}

/// Response from the ciphertext-handle endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiphertextHandleResponse {
    /// Record ID
    pub id: String,
    /// Opaque on-chain reference to the encrypted value
    pub handle: String,
}

/// Response from the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Whether the registry contract is reachable and serving
    pub available: bool,
}

/// Request body for creating a record
///
/// Blob fields are hex-encoded on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    /// New record ID (caller-assigned, timestamp-derived)
    pub id: String,
    /// Display label
    pub label: String,
    /// Ciphertext of the confidential value, hex-encoded
    pub ciphertext: String,
    /// Input-validity proof for the ciphertext, hex-encoded
    pub proof: String,
    /// Plaintext coarse score in [0,100]
    pub public_score: u8,
    /// Reserved word, always 0; kept for contract ABI compatibility
    #[serde(default)]
    pub reserved: u64,
    /// Integer category code
    pub category_code: u8,
}

/// Request body for submitting a decryption attestation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitVerificationRequest {
    /// Record ID being verified
    pub id: String,
    /// ABI-encoded clear values, hex-encoded
    pub encoded_plain: String,
    /// Decryption correctness proof, hex-encoded
    pub proof: String,
}

/// Response from the signing endpoint after a write is submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTxResponse {
    /// Hash of the submitted transaction
    pub tx_hash: String,
    /// Submission outcome as reported by the signer
    pub status: SubmitStatus,
    /// Detail for rejected/failed submissions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of a write submission at the signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    /// Signed and broadcast; confirmation pending
    Submitted,
    /// The user declined the signature prompt
    Rejected,
    /// Submission failed before broadcast
    Failed,
}

/// Response from the receipt-poll endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxStatusResponse {
    /// Hash of the transaction being polled
    pub tx_hash: String,
    /// Current confirmation status
    pub status: TxStatus,
    /// Block number once mined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Revert reason when status is `Reverted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_reason: Option<String>,
}

/// Confirmation status of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Not yet mined
    Pending,
    /// Mined and successful
    Confirmed,
    /// Mined but reverted
    Reverted,
}
