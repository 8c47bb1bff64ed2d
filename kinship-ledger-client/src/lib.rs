//! Rust client for the kinship registry ledger gateway
//!
//! The gateway fronts a registry contract that stores confidential match
//! scores as ciphertext handles. This crate covers both of its paths:
//! the read path (record queries, no signature) and the write path
//! (record creation and decryption attestations, signed via the caller's
//! signer endpoint).
//!
//! # Example
//!
//! ```rust,no_run
//! use kinship_ledger_client::{LedgerClient, GatewayConfig, CreateRecordRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LedgerClient::new(GatewayConfig {
//!     base_url: "http://localhost:8545".into(),
//!     contract_address: "0x51a9...".into(),
//!     ..Default::default()
//! });
//!
//! // Read path
//! let ids = client.list_record_ids().await?;
//!
//! // Write path: submission then confirmation
//! let pending = client
//!     .create_record(&CreateRecordRequest {
//!         id: "match-1700000000000".into(),
//!         label: "Jane".into(),
//!         ciphertext: "8f3a...".into(),
//!         proof: "77b1...".into(),
//!         public_score: 62,
//!         reserved: 0,
//!         category_code: 2,
//!     })
//!     .await?;
//! let receipt = pending.wait().await?;
//! println!("mined in block {}", receipt.block_number);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod tx;
pub mod types;

// Re-export main types
pub use client::LedgerClient;
pub use error::{LedgerError, Result};
pub use tx::{PendingTx, TxReceipt};
pub use types::*;
