use crate::{AttestError, ExecutionStep, InputCommitment, MerkleTree};
use chrono::{DateTime, Utc};
use lineage_types::{Cid, Clock, Did, Digest, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Records one execution run for an executor identity.
///
/// Produces the two roots an executor anchors on the ledger and the trace
/// document it uploads as `trace_cid`.
pub struct ExecutionTrace {
    agent_did: Did,
    input: Option<InputCommitment>,
    steps: Vec<ExecutionStep>,
    clock: Arc<dyn Clock>,
}

impl ExecutionTrace {
    pub fn new(agent_did: Did) -> Self {
        Self::with_clock(agent_did, Arc::new(SystemClock))
    }

    pub fn with_clock(agent_did: Did, clock: Arc<dyn Clock>) -> Self {
        Self {
            agent_did,
            input: None,
            steps: Vec::new(),
            clock,
        }
    }

    pub fn agent_did(&self) -> &Did {
        &self.agent_did
    }

    pub fn input(&self) -> Option<&InputCommitment> {
        self.input.as_ref()
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    /// Commit to the run's inputs and return the input root. Replaces any
    /// earlier commitment.
    pub fn commit_inputs(
        &mut self,
        document_cid: Cid,
        chunks: Vec<String>,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<Digest, AttestError> {
        let commitment = InputCommitment::new(document_cid, chunks, metadata, self.clock.now());
        let root = commitment.root()?;

        debug!(
            did = %self.agent_did,
            document_cid = %commitment.document_cid,
            chunks = commitment.chunks.len(),
            input_root = %root,
            "Inputs committed"
        );
        self.input = Some(commitment);
        Ok(root)
    }

    pub fn log_step(&mut self, step_type: impl Into<String>, data: serde_json::Value) {
        let step = ExecutionStep::new(step_type, data, self.clock.now());
        self.steps.push(step);
    }

    pub fn step_hashes(&self) -> Result<Vec<Digest>, AttestError> {
        self.steps.iter().map(ExecutionStep::hash).collect()
    }

    /// Merkle root over the step hashes, or the empty-tree root with no steps.
    pub fn execution_root(&self) -> Result<Digest, AttestError> {
        let root = MerkleTree::new(self.step_hashes()?).root();
        debug!(
            did = %self.agent_did,
            steps = self.steps.len(),
            execution_root = %root,
            "Execution root computed"
        );
        Ok(root)
    }

    /// Snapshot of the run for off-ledger storage.
    pub fn document(&self) -> Result<TraceDocument, AttestError> {
        let step_hashes = self.step_hashes()?;
        let execution_root = MerkleTree::new(step_hashes.clone()).root();

        Ok(TraceDocument {
            agent_did: self.agent_did.clone(),
            input_commitment: self.input.clone(),
            steps: self.steps.clone(),
            step_hashes,
            execution_root,
            created_at: self.clock.now(),
        })
    }

    /// Clear inputs and steps for the next run.
    pub fn reset(&mut self) {
        self.input = None;
        self.steps.clear();
    }
}

/// Serialized execution trace, stored under a record's `trace_cid`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceDocument {
    pub agent_did: Did,
    pub input_commitment: Option<InputCommitment>,
    pub steps: Vec<ExecutionStep>,
    pub step_hashes: Vec<Digest>,
    pub execution_root: Digest,
    pub created_at: DateTime<Utc>,
}

impl TraceDocument {
    /// Recompute the execution root from `steps`, ignoring the stored
    /// `step_hashes` and `execution_root`.
    pub fn recompute_root(&self) -> Result<Digest, AttestError> {
        let hashes = self
            .steps
            .iter()
            .map(ExecutionStep::hash)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MerkleTree::new(hashes).root())
    }

    pub fn to_json(&self) -> Result<String, AttestError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, AttestError> {
        Ok(serde_json::from_str(json)?)
    }
}
