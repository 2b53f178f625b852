use crate::StoreResult;
use chrono::{DateTime, Utc};
use lineage_types::{Cid, Did, Digest, Principal, ProvenanceRecord, RecordId, TokenId};
use serde::{Deserialize, Serialize};

/// Record append payload. Id, previous hash and record hash are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub token_id: TokenId,
    pub input_cid: Cid,
    pub input_root: Digest,
    pub output_cid: Cid,
    pub execution_root: Digest,
    pub trace_cid: Cid,
    pub agent_did: Did,
    pub proof_cid: Option<Cid>,
    pub executor: Principal,
    pub timestamp: DateTime<Utc>,
}

/// Generic query window for paged reads. A zero limit means unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

impl QueryWindow {
    pub fn all() -> Self {
        Self::default()
    }
}

/// Storage interface for provenance records.
///
/// Implementations must be append-only: a record, once returned by `append`,
/// is never changed or removed.
pub trait RecordStore: Send + Sync {
    /// Append a record and return the stored, hash-linked entry.
    fn append(&self, record: NewRecord) -> StoreResult<ProvenanceRecord>;

    /// Get one record by id.
    fn get(&self, id: RecordId) -> StoreResult<Option<ProvenanceRecord>>;

    /// Number of records appended so far.
    fn record_count(&self) -> StoreResult<u64>;

    /// Read records in ascending id order.
    fn list(&self, window: QueryWindow) -> StoreResult<Vec<ProvenanceRecord>>;

    /// Records referencing `token_id`, ascending.
    fn by_token(&self, token_id: TokenId) -> StoreResult<Vec<ProvenanceRecord>> {
        Ok(self
            .list(QueryWindow::all())?
            .into_iter()
            .filter(|record| record.token_id == token_id)
            .collect())
    }

    /// Hash of the latest record.
    fn head_hash(&self) -> StoreResult<Option<Digest>>;
}

pub(crate) fn apply_window<T>(values: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = values.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}
