//! Cipher service seam
//!
//! Abstracts the homomorphic encryption capability: encrypting plaintext
//! integers bound to a submission context, and producing proof-carrying
//! decryptions for on-chain attestation. The cryptosystem itself lives
//! behind this trait; the SDK only coordinates it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::CiphertextHandle;

mod mock;
mod relayer;

pub use mock::MockCipher;
pub use relayer::{RelayerClient, RelayerConfig};

/// Ciphertext and input-validity proof produced by encryption
///
/// Both blobs are bound to the (contract, caller) context they were
/// requested under and cannot be replayed elsewhere.
#[derive(Debug, Clone)]
pub struct EncryptedInput {
    /// Ciphertext of the plaintext integer
    pub ciphertext: Vec<u8>,
    /// Proof that the ciphertext encrypts a well-formed input
    pub proof: Vec<u8>,
}

/// Decryption of one or more ciphertext handles plus the attestation
/// material to submit on-chain
#[derive(Debug, Clone)]
pub struct DecryptionProof {
    /// Recovered plaintexts, keyed by handle
    pub clear_values: HashMap<CiphertextHandle, u64>,
    /// ABI-encoded clear values, as the ledger contract expects them
    pub encoded_plain: Vec<u8>,
    /// Proof that the clear values are the correct decryptions
    pub proof: Vec<u8>,
}

/// Homomorphic cipher service
///
/// Decryption is an explicit two-phase handshake: the caller requests the
/// proof here, then submits the attestation through the ledger write path
/// itself. The service never performs on-chain calls.
#[async_trait]
pub trait CipherService: Send + Sync {
    /// Check whether the service is initialized and reachable
    async fn is_available(&self) -> bool;

    /// Encrypt a plaintext integer under the (contract, caller) context
    async fn encrypt(&self, contract: &str, caller: &str, value: u64) -> Result<EncryptedInput>;

    /// Produce decryptions and a correctness attestation for the given
    /// handles, scoped to the contract context
    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        contract: &str,
    ) -> Result<DecryptionProof>;
}
