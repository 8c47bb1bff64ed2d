//! HTTP client for a cipher relayer service
//!
//! The relayer runs the actual homomorphic cryptosystem; this client only
//! ferries context-bound requests to it. Blobs travel hex-encoded.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CipherService, DecryptionProof, EncryptedInput};
use crate::error::{RegistryError, Result};
use crate::types::CiphertextHandle;

/// Relayer client configuration
#[derive(Debug, Clone)]
pub struct RelayerConfig {
    /// Base URL of the relayer HTTP API
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8547".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Serialize)]
struct EncryptRequest<'a> {
    contract: &'a str,
    caller: &'a str,
    value: u64,
}

#[derive(Deserialize)]
struct EncryptResponse {
    ciphertext: String,
    proof: String,
}

#[derive(Serialize)]
struct DecryptionProofRequest<'a> {
    contract: &'a str,
    handles: Vec<&'a str>,
}

#[derive(Deserialize)]
struct DecryptionProofResponse {
    clear_values: HashMap<String, u64>,
    encoded_plain: String,
    proof: String,
}

/// HTTP implementation of [`CipherService`]
pub struct RelayerClient {
    config: RelayerConfig,
    client: reqwest::Client,
}

impl RelayerClient {
    /// Create a new relayer client
    pub fn new(config: RelayerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { config, client }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RegistryError::Cipher(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Cipher(format!("HTTP {} - {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| RegistryError::Cipher(e.to_string()))
    }
}

#[async_trait]
impl CipherService for RelayerClient {
    async fn is_available(&self) -> bool {
        let url = format!("{}/cipher/v1/health", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn encrypt(&self, contract: &str, caller: &str, value: u64) -> Result<EncryptedInput> {
        debug!(contract, caller, "Requesting encryption");

        let body: EncryptResponse = self
            .post_json(
                "/cipher/v1/encrypt",
                &EncryptRequest {
                    contract,
                    caller,
                    value,
                },
            )
            .await?;

        Ok(EncryptedInput {
            ciphertext: hex::decode(&body.ciphertext)
                .map_err(|e| RegistryError::Cipher(format!("invalid ciphertext hex: {}", e)))?,
            proof: hex::decode(&body.proof)
                .map_err(|e| RegistryError::Cipher(format!("invalid proof hex: {}", e)))?,
        })
    }

    async fn request_decryption_proof(
        &self,
        handles: &[CiphertextHandle],
        contract: &str,
    ) -> Result<DecryptionProof> {
        debug!(contract, count = handles.len(), "Requesting decryption proof");

        let body: DecryptionProofResponse = self
            .post_json(
                "/cipher/v1/decryption-proof",
                &DecryptionProofRequest {
                    contract,
                    handles: handles.iter().map(|h| h.as_str()).collect(),
                },
            )
            .await?;

        Ok(DecryptionProof {
            clear_values: body
                .clear_values
                .into_iter()
                .map(|(handle, value)| (CiphertextHandle(handle), value))
                .collect(),
            encoded_plain: hex::decode(&body.encoded_plain)
                .map_err(|e| RegistryError::Cipher(format!("invalid encoding hex: {}", e)))?,
            proof: hex::decode(&body.proof)
                .map_err(|e| RegistryError::Cipher(format!("invalid proof hex: {}", e)))?,
        })
    }
}
