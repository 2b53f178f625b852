//! Canonical hashing of inputs and execution steps.
//!
//! Canonical form is serde_json over field-ordered structs with sorted maps,
//! so the same content always yields the same digest.

use crate::AttestError;
use chrono::{DateTime, Utc};
use lineage_types::{Cid, Digest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Commitment to everything an executor consumed for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputCommitment {
    pub document_cid: Cid,
    pub chunks: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl InputCommitment {
    pub fn new(
        document_cid: Cid,
        chunks: Vec<String>,
        metadata: BTreeMap<String, serde_json::Value>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            document_cid,
            chunks,
            metadata,
            timestamp,
        }
    }

    /// The input root anchored on the ledger.
    pub fn root(&self) -> Result<Digest, AttestError> {
        canonical_digest(self)
    }
}

/// One step of an execution: a prompt, a tool call, a model response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub step_type: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionStep {
    pub fn new(
        step_type: impl Into<String>,
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            step_type: step_type.into(),
            data,
            timestamp,
        }
    }

    /// Leaf hash of this step in the execution tree.
    pub fn hash(&self) -> Result<Digest, AttestError> {
        canonical_digest(self)
    }
}

fn canonical_digest<T: Serialize>(value: &T) -> Result<Digest, AttestError> {
    let bytes = serde_json::to_vec(value)?;
    Ok(Digest::hash(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()
    }

    fn commitment(metadata: BTreeMap<String, serde_json::Value>) -> InputCommitment {
        InputCommitment::new(
            Cid::new("QmXYZ123"),
            vec!["chunk1".into(), "chunk2".into(), "chunk3".into()],
            metadata,
            at(),
        )
    }

    #[test]
    fn input_root_is_deterministic() {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), json!("user_upload"));
        metadata.insert("lang".to_string(), json!("en"));

        let first = commitment(metadata.clone()).root().unwrap();
        let second = commitment(metadata).root().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn input_root_covers_every_field() {
        let base = commitment(BTreeMap::new());
        let root = base.root().unwrap();

        let mut other = base.clone();
        other.chunks.push("chunk4".into());
        assert_ne!(other.root().unwrap(), root);

        let mut other = base.clone();
        other.document_cid = Cid::new("QmOther");
        assert_ne!(other.root().unwrap(), root);

        let mut other = base;
        other.metadata.insert("k".into(), json!(1));
        assert_ne!(other.root().unwrap(), root);
    }

    #[test]
    fn step_hash_ignores_json_key_order() {
        let a = ExecutionStep::new(
            "llm_response",
            json!({"text": "summary", "model": "m1"}),
            at(),
        );
        let b = ExecutionStep::new(
            "llm_response",
            json!({"model": "m1", "text": "summary"}),
            at(),
        );
        assert_eq!(a.hash().unwrap(), b.hash().unwrap());

        let c = ExecutionStep::new("tool_call", json!({"text": "summary", "model": "m1"}), at());
        assert_ne!(a.hash().unwrap(), c.hash().unwrap());
    }
}
