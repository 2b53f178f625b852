//! In-memory reference implementation of `RecordStore`.
//!
//! Deterministic and test-friendly. Records are kept in id order and indexed
//! by token id, so per-token reads do not scan the whole ledger.

use crate::chain::compute_record_hash;
use crate::store::{apply_window, NewRecord, QueryWindow, RecordStore};
use crate::{StoreError, StoreResult};
use lineage_types::{Digest, ProvenanceRecord, RecordId, TokenId};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory record store.
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    records: Vec<ProvenanceRecord>,
    by_token: HashMap<TokenId, Vec<RecordId>>,
}

impl StoreState {
    // Ids past the platform's index range were never appended.
    fn record(&self, id: RecordId) -> Option<&ProvenanceRecord> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.records.get(index))
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn append(&self, record: NewRecord) -> StoreResult<ProvenanceRecord> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;

        let id = RecordId(guard.records.len() as u64);
        let previous_hash = guard.records.last().map(|r| r.record_hash);

        let mut stored = ProvenanceRecord {
            id,
            token_id: record.token_id,
            input_cid: record.input_cid,
            input_root: record.input_root,
            output_cid: record.output_cid,
            execution_root: record.execution_root,
            trace_cid: record.trace_cid,
            agent_did: record.agent_did,
            proof_cid: record.proof_cid,
            executor: record.executor,
            timestamp: record.timestamp,
            previous_hash,
            record_hash: Digest::default(),
        };
        stored.record_hash = compute_record_hash(&stored)?;

        guard.by_token.entry(stored.token_id).or_default().push(id);
        guard.records.push(stored.clone());
        Ok(stored)
    }

    fn get(&self, id: RecordId) -> StoreResult<Option<ProvenanceRecord>> {
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;
        Ok(guard.record(id).cloned())
    }

    fn record_count(&self) -> StoreResult<u64> {
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;
        Ok(guard.records.len() as u64)
    }

    fn list(&self, window: QueryWindow) -> StoreResult<Vec<ProvenanceRecord>> {
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;
        Ok(apply_window(guard.records.clone(), window))
    }

    fn by_token(&self, token_id: TokenId) -> StoreResult<Vec<ProvenanceRecord>> {
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;
        Ok(guard
            .by_token
            .get(&token_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| guard.record(*id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn head_hash(&self) -> StoreResult<Option<Digest>> {
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;
        Ok(guard.records.last().map(|r| r.record_hash))
    }
}
