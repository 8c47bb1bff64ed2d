//! Trait adapters for the HTTP gateway client

use async_trait::async_trait;
use kinship_ledger_client::{
    CreateRecordRequest, LedgerClient, PendingTx, SubmitVerificationRequest,
};

use super::{LedgerRead, LedgerWrite, NewRecordTx};
use crate::error::Result;
use crate::types::{CiphertextHandle, Record, RecordId};

#[async_trait]
impl LedgerRead for LedgerClient {
    async fn list_record_ids(&self) -> Result<Vec<RecordId>> {
        let ids = LedgerClient::list_record_ids(self).await?;
        Ok(ids.into_iter().map(RecordId).collect())
    }

    async fn get_record(&self, id: &RecordId) -> Result<Record> {
        let detail = LedgerClient::get_record(self, id.as_str()).await?;
        Ok(Record::from(detail))
    }

    async fn get_ciphertext_handle(&self, id: &RecordId) -> Result<CiphertextHandle> {
        let handle = LedgerClient::get_ciphertext_handle(self, id.as_str()).await?;
        Ok(CiphertextHandle(handle))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(LedgerClient::health_check(self).await?)
    }
}

#[async_trait]
impl LedgerWrite for LedgerClient {
    async fn create_record(&self, tx: NewRecordTx) -> Result<PendingTx> {
        let request = CreateRecordRequest {
            id: tx.id.0,
            label: tx.label,
            ciphertext: hex::encode(&tx.ciphertext),
            proof: hex::encode(&tx.proof),
            public_score: tx.public_score,
            reserved: 0,
            category_code: tx.category.code(),
        };

        Ok(LedgerClient::create_record(self, &request).await?)
    }

    async fn submit_verification(
        &self,
        id: &RecordId,
        encoded_plain: &[u8],
        proof: &[u8],
    ) -> Result<PendingTx> {
        let request = SubmitVerificationRequest {
            id: id.0.clone(),
            encoded_plain: hex::encode(encoded_plain),
            proof: hex::encode(proof),
        };

        Ok(LedgerClient::submit_verification(self, &request).await?)
    }
}
