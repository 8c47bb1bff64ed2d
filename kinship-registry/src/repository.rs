//! Record repository
//!
//! In-memory cache of all known records, rebuilt by full reload from the
//! ledger read path. The snapshot is replaced wholesale on each reload
//! (copy-on-reload), never mutated in place, so readers never observe a
//! torn update.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::ledger::LedgerRead;
use crate::types::{Record, RecordId};

/// Seconds in seven days, the window for the "recent" stat
const RECENT_WINDOW_SECS: i64 = 604_800;

/// Coarse-score threshold for the "high match" stat
const HIGH_MATCH_SCORE: u8 = 80;

/// Verification-status filter for list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Verified,
    Pending,
}

/// Filter over the cached snapshot
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive match against label or category name
    pub search: Option<String>,
    /// Verification-status tab
    pub status: StatusFilter,
}

impl RecordFilter {
    fn matches(&self, record: &Record) -> bool {
        let matches_search = match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                record.label.to_lowercase().contains(&term)
                    || record.category_name().to_lowercase().contains(&term)
            }
        };

        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Verified => record.is_verified,
            StatusFilter::Pending => !record.is_verified,
        };

        matches_search && matches_status
    }
}

/// Aggregate counts over the cached snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepositoryStats {
    /// All cached records
    pub total: usize,
    /// Records with an attested plaintext
    pub verified: usize,
    /// Records with a coarse score of 80 or above
    pub high_match: usize,
    /// Records created within the last seven days
    pub recent: usize,
}

/// In-memory record cache over the ledger read path
pub struct RecordRepository {
    ledger: Arc<dyn LedgerRead>,
    snapshot: RwLock<Arc<Vec<Record>>>,
}

impl RecordRepository {
    /// Create an empty repository over the given read path
    pub fn new(ledger: Arc<dyn LedgerRead>) -> Self {
        Self {
            ledger,
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Rebuild the snapshot from the ledger
    ///
    /// Fetches the full id list, then each record's detail individually.
    /// A detail-fetch failure for a single record is logged and skipped,
    /// preserving partial availability; only an id-list failure aborts
    /// the reload. Returns the number of records cached.
    pub async fn reload(&self) -> Result<usize> {
        let ids = self.ledger.list_record_ids().await?;

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.ledger.get_record(id).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(record_id = %id, error = %err, "Skipping record: detail fetch failed");
                }
            }
        }

        debug!(total = ids.len(), cached = records.len(), "Repository reloaded");

        let mut snapshot = self.snapshot.write().await;
        *snapshot = Arc::new(records);
        Ok(snapshot.len())
    }

    /// Drop the snapshot, e.g. when the session is lost
    pub async fn clear(&self) {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Arc::new(Vec::new());
    }

    /// Current snapshot, in ledger enumeration order
    ///
    /// Cheap to call; the returned `Arc` stays coherent even if a reload
    /// swaps the snapshot underneath.
    pub async fn records(&self) -> Arc<Vec<Record>> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Look up one cached record by id
    pub async fn get(&self, id: &RecordId) -> Option<Record> {
        self.records().await.iter().find(|r| &r.id == id).cloned()
    }

    /// Records matching the given filter
    pub async fn filtered(&self, filter: &RecordFilter) -> Vec<Record> {
        self.records()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Aggregate counts over the snapshot
    pub async fn stats(&self) -> RepositoryStats {
        let now = chrono::Utc::now().timestamp();
        let records = self.records().await;

        RepositoryStats {
            total: records.len(),
            verified: records.iter().filter(|r| r.is_verified).count(),
            high_match: records
                .iter()
                .filter(|r| r.public_score >= HIGH_MATCH_SCORE)
                .count(),
            recent: records
                .iter()
                .filter(|r| now - r.created_at < RECENT_WINDOW_SECS)
                .count(),
        }
    }
}
