use crate::{AttestError, InputCommitment, TraceDocument};
use lineage_types::{ProvenanceRecord, RecordId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome of checking one ledger record against its off-ledger artifacts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub record_id: RecordId,
    pub input_root_matches: bool,
    pub execution_root_matches: bool,
    /// The trace's stored root equals the root recomputed from its steps.
    pub trace_consistent: bool,
    pub agent_matches: bool,
    pub step_count: usize,
}

impl AuditReport {
    pub fn is_verified(&self) -> bool {
        self.input_root_matches
            && self.execution_root_matches
            && self.trace_consistent
            && self.agent_matches
    }
}

/// Re-derives anchored roots from fetched artifacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Auditor;

impl Auditor {
    /// Compare `record` with the input commitment and trace document fetched
    /// from its content identifiers. Mismatches are reported, not raised.
    pub fn audit(
        record: &ProvenanceRecord,
        input: &InputCommitment,
        trace: &TraceDocument,
    ) -> Result<AuditReport, AttestError> {
        let recomputed = trace.recompute_root()?;
        let report = AuditReport {
            record_id: record.id,
            input_root_matches: input.root()? == record.input_root,
            execution_root_matches: recomputed == record.execution_root,
            trace_consistent: recomputed == trace.execution_root,
            agent_matches: trace.agent_did == record.agent_did,
            step_count: trace.steps.len(),
        };

        if report.is_verified() {
            info!(record_id = %record.id, did = %record.agent_did, "Record verified");
        } else {
            warn!(
                record_id = %record.id,
                did = %record.agent_did,
                input_root_matches = report.input_root_matches,
                execution_root_matches = report.execution_root_matches,
                trace_consistent = report.trace_consistent,
                agent_matches = report.agent_matches,
                "Record failed verification"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExecutionTrace;
    use chrono::Utc;
    use lineage_types::{Cid, Did, Digest, Principal, TokenId};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn executed() -> (ExecutionTrace, Digest) {
        let mut trace = ExecutionTrace::new(Did::new("did:key:zAgent"));
        let input_root = trace
            .commit_inputs(Cid::new("QmDoc"), vec!["c1".into()], BTreeMap::new())
            .unwrap();
        trace.log_step("prompt", json!({"text": "hi"}));
        trace.log_step("llm_response", json!({"text": "hello"}));
        (trace, input_root)
    }

    fn record_for(trace: &ExecutionTrace, input_root: Digest) -> ProvenanceRecord {
        ProvenanceRecord {
            id: RecordId(4),
            token_id: TokenId(0),
            input_cid: Cid::new("QmInput"),
            input_root,
            output_cid: Cid::new("QmOut"),
            execution_root: trace.execution_root().unwrap(),
            trace_cid: Cid::new("QmTrace"),
            agent_did: trace.agent_did().clone(),
            proof_cid: None,
            executor: Principal::new("0xA"),
            timestamp: Utc::now(),
            previous_hash: None,
            record_hash: Digest::default(),
        }
    }

    #[test]
    fn honest_run_verifies() {
        let (trace, input_root) = executed();
        let record = record_for(&trace, input_root);
        let input = trace.input().unwrap().clone();

        let report = Auditor::audit(&record, &input, &trace.document().unwrap()).unwrap();
        assert!(report.is_verified());
        assert_eq!(report.record_id, RecordId(4));
        assert_eq!(report.step_count, 2);
    }

    #[test]
    fn each_mismatch_is_reported() {
        let (trace, input_root) = executed();
        let input = trace.input().unwrap().clone();
        let document = trace.document().unwrap();

        let mut record = record_for(&trace, input_root);
        record.input_root = Digest::hash(b"other input");
        let report = Auditor::audit(&record, &input, &document).unwrap();
        assert!(!report.input_root_matches);
        assert!(report.execution_root_matches);
        assert!(!report.is_verified());

        let mut record = record_for(&trace, input_root);
        record.agent_did = Did::new("did:key:zImpostor");
        let report = Auditor::audit(&record, &input, &document).unwrap();
        assert!(!report.agent_matches);
        assert!(!report.is_verified());

        let record = record_for(&trace, input_root);
        let mut forged = document.clone();
        forged.steps.pop();
        forged.execution_root = record.execution_root;
        let report = Auditor::audit(&record, &input, &forged).unwrap();
        assert!(!report.execution_root_matches);
        assert!(!report.trace_consistent);
        assert_eq!(report.step_count, 1);
    }
}
