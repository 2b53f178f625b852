//! Hash links between consecutive records.
//!
//! `record_hash` covers every other field of the record, including the
//! previous record's hash, so rewriting any stored record breaks every link
//! after it.

use crate::{LedgerError, StoreError};
use chrono::{DateTime, Utc};
use lineage_types::{Cid, Did, Digest, Principal, ProvenanceRecord, RecordId, TokenId};
use serde::Serialize;

const RECORD_DOMAIN: &[u8] = b"lineage.provenance.record.v1";

#[derive(Serialize)]
struct HashedFields<'a> {
    id: RecordId,
    token_id: TokenId,
    input_cid: &'a Cid,
    input_root: &'a Digest,
    output_cid: &'a Cid,
    execution_root: &'a Digest,
    trace_cid: &'a Cid,
    agent_did: &'a Did,
    proof_cid: Option<&'a Cid>,
    executor: &'a Principal,
    timestamp: &'a DateTime<Utc>,
    previous_hash: Option<&'a Digest>,
}

/// BLAKE3 over the canonical encoding of every field except `record_hash`.
pub fn compute_record_hash(record: &ProvenanceRecord) -> Result<Digest, StoreError> {
    let fields = HashedFields {
        id: record.id,
        token_id: record.token_id,
        input_cid: &record.input_cid,
        input_root: &record.input_root,
        output_cid: &record.output_cid,
        execution_root: &record.execution_root,
        trace_cid: &record.trace_cid,
        agent_did: &record.agent_did,
        proof_cid: record.proof_cid.as_ref(),
        executor: &record.executor,
        timestamp: &record.timestamp,
        previous_hash: record.previous_hash.as_ref(),
    };

    let mut canonical = RECORD_DOMAIN.to_vec();
    serde_json::to_writer(&mut canonical, &fields)
        .map_err(|err| StoreError::Serialization(err.to_string()))?;
    Ok(Digest::hash(&canonical))
}

/// Validate id contiguity, hash links, and recomputed hashes for a full
/// ascending run of records starting at id 0.
pub fn verify_chain(records: &[ProvenanceRecord]) -> Result<(), LedgerError> {
    for (index, record) in records.iter().enumerate() {
        let expected_id = index as u64;
        if record.id.0 != expected_id {
            return Err(LedgerError::IntegrityViolation {
                record_id: record.id.0,
                reason: format!("expected id {}, found {}", expected_id, record.id.0),
            });
        }

        let expected_prev = if index == 0 {
            None
        } else {
            Some(records[index - 1].record_hash)
        };
        if record.previous_hash != expected_prev {
            return Err(LedgerError::IntegrityViolation {
                record_id: record.id.0,
                reason: "previous hash link mismatch".into(),
            });
        }

        if compute_record_hash(record)? != record.record_hash {
            return Err(LedgerError::IntegrityViolation {
                record_id: record.id.0,
                reason: "record hash mismatch".into(),
            });
        }
    }

    Ok(())
}
