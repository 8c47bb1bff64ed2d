//! Core domain types for the registry SDK

use kinship_ledger_client::RecordDetail;
use serde::{Deserialize, Serialize};

/// Inclusive upper bound for both confidential and coarse scores
pub const MAX_SCORE: u64 = 100;

/// Opaque record identifier
///
/// Assigned at creation time from the submission timestamp, so ids are
/// monotonically distinguishing across one client. Uniqueness is a hard
/// precondition for repository operations, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Derive a fresh id from the current wall clock
    ///
    /// A process-local sequence number keeps ids distinct when several
    /// submissions land in the same millisecond.
    pub fn generate() -> Self {
        static SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Self(format!(
            "match-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            seq
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque on-chain reference to an encrypted value
///
/// Not the ciphertext bytes themselves; the cipher service resolves the
/// handle when producing a decryption proof.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CiphertextHandle(pub String);

impl CiphertextHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relationship category for a match record
///
/// The integer code is the authoritative on-chain representation; the
/// display name is derived client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Parent,
    Sibling,
    Cousin,
    Grandparent,
    AuntUncle,
}

impl Category {
    /// All categories, in code order
    pub const ALL: [Category; 5] = [
        Category::Parent,
        Category::Sibling,
        Category::Cousin,
        Category::Grandparent,
        Category::AuntUncle,
    ];

    /// Integer code stored on the ledger
    pub fn code(&self) -> u8 {
        match self {
            Category::Parent => 1,
            Category::Sibling => 2,
            Category::Cousin => 3,
            Category::Grandparent => 4,
            Category::AuntUncle => 5,
        }
    }

    /// Resolve a ledger code back to a category
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Category::Parent => "Parent",
            Category::Sibling => "Sibling",
            Category::Cousin => "Cousin",
            Category::Grandparent => "Grandparent",
            Category::AuntUncle => "Aunt/Uncle",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A confidential match-score record as observed from the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique, timestamp-derived id
    pub id: RecordId,
    /// Free-text display name
    pub label: String,
    /// Relationship category (`None` when the ledger carries an unknown code)
    pub category: Option<Category>,
    /// Creation timestamp (seconds since epoch), fixed at ledger-write time
    pub created_at: i64,
    /// Creating account address
    pub owner: String,
    /// Plaintext coarse score in [0,100]; independent of the confidential value
    pub public_score: u8,
    /// Whether the confidential value has been publicly attested
    pub is_verified: bool,
    /// The attested plaintext; present iff `is_verified`
    pub verified_value: Option<u64>,
    /// Opaque reference to the encrypted confidential value, set at
    /// creation and immutable thereafter
    pub ciphertext_handle: CiphertextHandle,
}

impl Record {
    /// Display name of the category, falling back to the raw code form
    pub fn category_name(&self) -> String {
        match self.category {
            Some(c) => c.name().to_string(),
            None => "Unknown".to_string(),
        }
    }
}

impl From<RecordDetail> for Record {
    fn from(detail: RecordDetail) -> Self {
        Record {
            id: RecordId(detail.id),
            label: detail.label,
            category: Category::from_code(detail.category_code),
            created_at: detail.created_at,
            owner: detail.owner,
            public_score: detail.public_score,
            is_verified: detail.is_verified,
            verified_value: detail.verified_value,
            ciphertext_handle: CiphertextHandle(detail.ciphertext_handle),
        }
    }
}

/// Input for submitting a new record
#[derive(Debug, Clone)]
pub struct NewRecord {
    /// Display label
    pub label: String,
    /// The confidential match score, encrypted before submission
    pub score: u64,
    /// Relationship category
    pub category: Category,
    /// Plaintext coarse score in [0,100] stored unencrypted for filtering;
    /// deliberately independent of `score`
    pub public_score: u8,
}

/// Session lifecycle events
///
/// Wallet connection is managed outside this crate; the orchestrator
/// reacts to these events rather than owning connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A wallet session was established for the given account
    Established { address: String },
    /// The wallet session ended
    Lost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_code_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_code(category.code()), Some(category));
        }
        assert_eq!(Category::from_code(0), None);
        assert_eq!(Category::from_code(99), None);
    }

    #[test]
    fn test_record_from_detail_unknown_code() {
        let detail = RecordDetail {
            id: "match-1".into(),
            label: "Jane".into(),
            category_code: 42,
            created_at: 1700000000,
            owner: "0xabcd".into(),
            public_score: 80,
            is_verified: false,
            verified_value: None,
            ciphertext_handle: "0xh1".into(),
        };

        let record = Record::from(detail);
        assert_eq!(record.category, None);
        assert_eq!(record.category_name(), "Unknown");
    }

    #[test]
    fn test_record_id_generate_prefix() {
        let id = RecordId::generate();
        assert!(id.as_str().starts_with("match-"));
    }
}
