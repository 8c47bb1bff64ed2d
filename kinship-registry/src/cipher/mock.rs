//! Mock cipher service for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use super::{CipherService, DecryptionProof, EncryptedInput};
use crate::error::{RegistryError, Result};
use crate::types::CiphertextHandle;

/// Mock cipher service for testing.
///
/// "Encryption" encodes the plaintext into the ciphertext bytes, so a
/// matching mock ledger can hand out handles the mock can later "decrypt"
/// without shared state. Call counters let tests assert which paths ran.
pub struct MockCipher {
    available: AtomicBool,
    fail_encrypt: AtomicBool,
    fail_decrypt: AtomicBool,
    encrypt_calls: AtomicU32,
    decrypt_calls: AtomicU32,
}

impl MockCipher {
    /// Create a new mock cipher
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            fail_encrypt: AtomicBool::new(false),
            fail_decrypt: AtomicBool::new(false),
            encrypt_calls: AtomicU32::new(0),
            decrypt_calls: AtomicU32::new(0),
        }
    }

    /// Set availability
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Make encryption requests fail
    pub fn with_failing_encrypt(self) -> Self {
        self.fail_encrypt.store(true, Ordering::SeqCst);
        self
    }

    /// Make decryption-proof requests fail
    pub fn with_failing_decrypt(self) -> Self {
        self.fail_decrypt.store(true, Ordering::SeqCst);
        self
    }

    /// Number of encryption requests served
    pub fn encrypt_calls(&self) -> u32 {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    /// Number of decryption-proof requests served
    pub fn decrypt_calls(&self) -> u32 {
        self.decrypt_calls.load(Ordering::SeqCst)
    }

    /// The handle a matching mock ledger derives for this ciphertext
    pub fn handle_for(ciphertext: &[u8]) -> CiphertextHandle {
        CiphertextHandle(format!("0x{}", hex::encode(ciphertext)))
    }

    fn value_from_handle(handle: &CiphertextHandle) -> Result<u64> {
        let raw = handle.as_str().trim_start_matches("0x");
        let bytes = hex::decode(raw)
            .map_err(|e| RegistryError::Cipher(format!("unknown handle {}: {}", handle, e)))?;
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| RegistryError::Cipher(format!("unknown handle {}", handle)))?;
        Ok(u64::from_be_bytes(bytes))
    }
}

impl Default for MockCipher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CipherService for MockCipher {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn encrypt(&self, _contract: &str, _caller: &str, value: u64) -> Result<EncryptedInput> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(RegistryError::Cipher("mock encryption failure".into()));
        }

        Ok(EncryptedInput {
            ciphertext: value.to_be_bytes().to_vec(),
            proof: b"input-proof".to_vec(),
        })
    }

    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        _contract: &str,
    ) -> Result<DecryptionProof> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_decrypt.load(Ordering::SeqCst) {
            return Err(RegistryError::Cipher("mock decryption failure".into()));
        }

        let mut clear_values = HashMap::new();
        let mut encoded_plain = Vec::new();
        for handle in handles {
            let value = Self::value_from_handle(handle)?;
            encoded_plain.extend_from_slice(&value.to_be_bytes());
            clear_values.insert(handle.clone(), value);
        }

        Ok(DecryptionProof {
            clear_values,
            encoded_plain,
            proof: b"attestation-proof".to_vec(),
        })
    }
}
