//! HTTP client for the ledger gateway API
//!
//! The gateway exposes two paths: a read path (record queries, no signature)
//! and a write path that forwards signed transactions through the caller's
//! signer. Writes resolve in two stages, submission and confirmation; see
//! [`PendingTx`].

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::tx::{PendingTx, TxReceipt};
use crate::types::*;

/// HTTP client for the ledger gateway
///
/// # Example
///
/// ```rust,no_run
/// use kinship_ledger_client::{LedgerClient, GatewayConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LedgerClient::new(GatewayConfig {
///     base_url: "http://localhost:8545".into(),
///     contract_address: "0x51a9...".into(),
///     ..Default::default()
/// });
///
/// let ids = client.list_record_ids().await?;
/// for id in &ids {
///     let record = client.get_record(id).await?;
///     println!("{}: verified={}", record.label, record.is_verified);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LedgerClient {
    config: GatewayConfig,
    client: Client,
}

impl LedgerClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        if let Some(ref api_key) = config.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                    .expect("Invalid API key"),
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { config, client }
    }

    /// The registry contract this client is scoped to
    pub fn contract_address(&self) -> &str {
        &self.config.contract_address
    }

    // ==================== Read path (no signature) ====================

    /// List all record IDs, in ledger enumeration order
    pub async fn list_record_ids(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/registry/v1/{}/records",
            self.config.base_url, self.config.contract_address
        );

        let response = self.client.get(&url).send().await?;
        let body: ListRecordIdsResponse = self.handle_response(response).await?;
        Ok(body.ids)
    }

    /// Get a record's stored detail
    pub async fn get_record(&self, id: &str) -> Result<RecordDetail> {
        let url = format!(
            "{}/registry/v1/{}/records/{}",
            self.config.base_url, self.config.contract_address, id
        );

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Get the ciphertext handle for a record's confidential value
    pub async fn get_ciphertext_handle(&self, id: &str) -> Result<String> {
        let url = format!(
            "{}/registry/v1/{}/records/{}/handle",
            self.config.base_url, self.config.contract_address, id
        );

        let response = self.client.get(&url).send().await?;
        let body: CiphertextHandleResponse = self.handle_response(response).await?;
        Ok(body.handle)
    }

    /// Check whether the registry contract is reachable and serving
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!(
            "{}/registry/v1/{}/health",
            self.config.base_url, self.config.contract_address
        );

        let response = self.client.get(&url).send().await?;
        let body: HealthResponse = self.handle_response(response).await?;
        Ok(body.available)
    }

    // ==================== Write path (requires signature) ====================

    /// Submit a new record with its committed ciphertext
    ///
    /// The write is atomic on-chain: either the record exists with its
    /// ciphertext or it does not exist at all.
    pub async fn create_record(&self, request: &CreateRecordRequest) -> Result<PendingTx> {
        let url = format!(
            "{}/registry/v1/{}/records",
            self.config.base_url, self.config.contract_address
        );

        let response = self.client.post(&url).json(request).send().await?;
        let submitted: SubmitTxResponse = self.handle_write_response(response).await?;
        self.pending_from_submission(submitted)
    }

    /// Submit a decryption attestation, atomically marking the record
    /// verified and storing the plaintext
    ///
    /// Fails with [`LedgerError::AlreadyVerified`] when called twice for
    /// the same record; the ledger accepts exactly one verification.
    pub async fn submit_verification(
        &self,
        request: &SubmitVerificationRequest,
    ) -> Result<PendingTx> {
        let url = format!(
            "{}/registry/v1/{}/records/{}/verify",
            self.config.base_url, self.config.contract_address, request.id
        );

        let response = self.client.post(&url).json(request).send().await?;
        let submitted: SubmitTxResponse = self.handle_write_response(response).await?;
        self.pending_from_submission(submitted)
    }

    // ==================== Internals ====================

    fn pending_from_submission(&self, submitted: SubmitTxResponse) -> Result<PendingTx> {
        match submitted.status {
            SubmitStatus::Rejected => Err(LedgerError::UserRejected),
            SubmitStatus::Failed => Err(LedgerError::Network(
                submitted.detail.unwrap_or_else(|| "submission failed".into()),
            )),
            SubmitStatus::Submitted => {
                debug!(tx_hash = %submitted.tx_hash, "Transaction submitted, polling for receipt");
                let tx_hash = submitted.tx_hash.clone();
                let poller = self.clone();
                Ok(PendingTx::new(
                    submitted.tx_hash,
                    Box::pin(async move { poller.wait_for_receipt(&tx_hash).await }),
                ))
            }
        }
    }

    /// Poll the receipt endpoint until the transaction is mined
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt> {
        let url = format!("{}/registry/v1/tx/{}", self.config.base_url, tx_hash);
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            let response = self.client.get(&url).send().await?;
            let status: TxStatusResponse = self.handle_response(response).await?;

            match status.status {
                TxStatus::Pending => tokio::time::sleep(interval).await,
                TxStatus::Confirmed => {
                    return Ok(TxReceipt {
                        tx_hash: status.tx_hash,
                        block_number: status.block_number.unwrap_or_default(),
                    })
                }
                TxStatus::Reverted => {
                    let reason = status.revert_reason.unwrap_or_else(|| "unknown".into());
                    return Err(classify_revert(reason));
                }
            }
        }
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if response.status() == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::NotFound(body));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Network(format!("HTTP {} - {}", status, body)));
        }

        Ok(response.json().await?)
    }

    async fn handle_write_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        // The gateway answers 409 when the contract would revert with
        // an already-verified condition, sparing the gas of a doomed write.
        if response.status() == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::AlreadyVerified(body));
        }

        self.handle_response(response).await
    }
}

/// Map a revert reason onto the error taxonomy
///
/// The already-verified condition must be recognized by message matching
/// because it surfaces as an ordinary revert when another actor wins the
/// race between submission and confirmation.
fn classify_revert(reason: String) -> LedgerError {
    if reason.to_ascii_lowercase().contains("already verified") {
        LedgerError::AlreadyVerified(reason)
    } else {
        LedgerError::Reverted(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_revert_already_verified() {
        let err = classify_revert("Data already verified".to_string());
        assert!(matches!(err, LedgerError::AlreadyVerified(_)));
    }

    #[test]
    fn test_classify_revert_other() {
        let err = classify_revert("out of gas".to_string());
        assert!(matches!(err, LedgerError::Reverted(_)));
    }
}
