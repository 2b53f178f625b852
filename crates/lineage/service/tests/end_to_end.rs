use chrono::{Duration, TimeZone, Utc};
use lineage_attest::ExecutionTrace;
use lineage_service::{
    DerivativeRequest, RecordQuery, ServiceError, Substrate, SubstrateConfig, TokenPolicy,
    UploadRequest,
};
use lineage_types::{Cid, Did, Digest, ErrorKind, ManualClock, Principal, RecordId, TokenId};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

fn deploy() -> (Substrate, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap(),
    ));
    let substrate = Substrate::deploy_with_clock(
        Principal::new("0xdeployer"),
        SubstrateConfig::default(),
        clock.clone(),
    )
    .unwrap();
    (substrate, clock)
}

fn derivative(
    token: TokenId,
    did: &Did,
    input_root: Digest,
    execution_root: Digest,
) -> DerivativeRequest {
    DerivativeRequest {
        token_id: token,
        input_cid: Cid::new("QmIn"),
        input_root,
        output_cid: Cid::new("QmOut"),
        execution_root,
        trace_cid: Cid::new("QmTrace"),
        agent_did: did.clone(),
        proof_cid: None,
    }
}

#[test]
fn mint_register_record_and_audit() {
    let (substrate, clock) = deploy();
    let alice = substrate.session(Principal::new("0xA"));
    let did = Did::new("did:key:abc");

    let token = alice
        .mint(Principal::new("0xA"), Cid::new("QmDoc1"))
        .unwrap();
    assert_eq!(token, TokenId(0));
    assert!(alice.has_access(token).unwrap());
    assert!(alice.is_authenticated().unwrap());

    alice
        .register_agent(did.clone(), "Summarizer", Cid::new("ipfs://meta"))
        .unwrap();

    let mut trace = ExecutionTrace::with_clock(did.clone(), clock.clone());
    let input_root = trace
        .commit_inputs(
            Cid::new("QmDoc1"),
            vec!["chunk1".into(), "chunk2".into()],
            BTreeMap::new(),
        )
        .unwrap();
    trace.log_step("prompt", json!({"text": "Summarize this document"}));
    trace.log_step("llm_response", json!({"text": "A summary"}));
    let execution_root = trace.execution_root().unwrap();

    clock.advance(Duration::seconds(5));
    let record_id = alice
        .record_derivative(derivative(token, &did, input_root, execution_root))
        .unwrap();
    assert_eq!(record_id, RecordId(0));

    let record = substrate.ledger().get_record(record_id).unwrap();
    assert_eq!(record.executor, Principal::new("0xA"));
    assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 5).unwrap());
    assert_eq!(record.input_root, input_root);
    assert_eq!(record.execution_root, execution_root);

    let input = trace.input().unwrap().clone();
    let document = trace.document().unwrap();
    let report = substrate.audit_record(record_id, &input, &document).unwrap();
    assert!(report.is_verified());
    assert_eq!(report.step_count, 2);
}

#[test]
fn deactivated_agent_blocks_recording_until_reactivated() {
    let (substrate, _) = deploy();
    let alice = substrate.session(Principal::new("0xA"));
    let did = Did::new("did:key:abc");
    alice
        .register_agent(did.clone(), "Summarizer", Cid::new("ipfs://meta"))
        .unwrap();

    alice.deactivate_agent(&did).unwrap();
    let err = alice
        .record_derivative(derivative(TokenId(0), &did, Digest::hash(b"h1"), Digest::hash(b"h2")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateError);
    assert!(err.user_message().contains("reactivate it"));
    assert_eq!(substrate.ledger().record_count().unwrap(), 0);

    alice.reactivate_agent(&did).unwrap();
    alice
        .record_derivative(derivative(TokenId(0), &did, Digest::hash(b"h1"), Digest::hash(b"h2")))
        .unwrap();
    assert_eq!(substrate.ledger().record_count().unwrap(), 1);
}

#[test]
fn any_caller_may_record_against_an_active_agent() {
    let (substrate, _) = deploy();
    let did = Did::new("did:key:abc");
    substrate
        .session(Principal::new("0xA"))
        .register_agent(did.clone(), "Summarizer", Cid::new("ipfs://meta"))
        .unwrap();

    let bob = substrate.session(Principal::new("0xB"));
    let id = bob
        .record_derivative(derivative(TokenId(99), &did, Digest::hash(b"h1"), Digest::hash(b"h2")))
        .unwrap();

    let record = substrate.ledger().get_record(id).unwrap();
    assert_eq!(record.executor, Principal::new("0xB"));
    assert_eq!(record.token_id, TokenId(99));
    assert_eq!(substrate.access().token_count().unwrap(), 0);
}

#[test]
fn ledger_queries_and_chain_over_a_session_history() {
    let (substrate, clock) = deploy();
    let a = Did::new("did:key:a");
    let b = Did::new("did:key:b");
    let alice = substrate.session(Principal::new("0xA"));
    let bob = substrate.session(Principal::new("0xB"));
    alice.register_agent(a.clone(), "A", Cid::new("ipfs://a")).unwrap();
    bob.register_agent(b.clone(), "B", Cid::new("ipfs://b")).unwrap();

    for (session, did, token) in [(&alice, &a, 0), (&bob, &b, 0), (&alice, &b, 1)] {
        clock.advance(Duration::minutes(1));
        session
            .record_derivative(derivative(
                TokenId(token),
                did,
                Digest::hash(b"in"),
                Digest::hash(b"ex"),
            ))
            .unwrap();
    }

    let ids: Vec<_> = substrate
        .ledger()
        .records_by_token(TokenId(0))
        .unwrap()
        .into_iter()
        .map(|r| r.id.0)
        .collect();
    assert_eq!(ids, vec![0, 1]);

    let by_alice = substrate
        .ledger()
        .query(RecordQuery {
            executor: Some(Principal::new("0xA")),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_alice.len(), 2);

    let stats = substrate.ledger().statistics().unwrap();
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.distinct_tokens, 2);

    let head = substrate.ledger().head_hash().unwrap().unwrap();
    assert_eq!(substrate.ledger().get_record(RecordId(2)).unwrap().record_hash, head);
    substrate.ledger().verify_chain().unwrap();
}

#[test]
fn vault_gates_uploads_on_token_possession() {
    let (substrate, _) = deploy();
    let alice = substrate.session(Principal::new("0xA"));
    let bob = substrate.session(Principal::new("0xB"));
    let token = alice.mint(Principal::new("0xA"), Cid::new("QmDoc")).unwrap();

    let upload = UploadRequest {
        token_id: token,
        cid: Cid::new("QmDoc"),
        document_hash: Digest::hash(b"contract bytes"),
        file_name: "contract.pdf".into(),
        file_size: 4096,
    };

    let err = bob.upload_document(upload.clone()).unwrap_err();
    assert!(matches!(err, ServiceError::Vault(_)));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let id = alice.upload_document(upload).unwrap();
    assert!(bob
        .verify_document(id, &Digest::hash(b"contract bytes"))
        .unwrap());
    assert!(!bob.verify_document(id, &Digest::hash(b"other")).unwrap());
    assert_eq!(
        substrate.vault().documents_for_token(token).unwrap(),
        vec![id]
    );
}

#[test]
fn one_per_holder_policy_refuses_a_second_token() {
    let config = SubstrateConfig {
        token_policy: TokenPolicy::OnePerHolder,
        ..Default::default()
    };
    let substrate = Substrate::deploy(Principal::new("0xdeployer"), config).unwrap();
    let minter = substrate.session(Principal::new("0xminter"));

    minter.mint(Principal::new("0xA"), Cid::new("QmDoc1")).unwrap();
    let err = minter
        .mint(Principal::new("0xA"), Cid::new("QmDoc2"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert!(err.user_message().contains("one per holder"));
    assert_eq!(substrate.access().token_count().unwrap(), 1);

    minter.mint(Principal::new("0xB"), Cid::new("QmDoc2")).unwrap();
    assert_eq!(substrate.access().token_count().unwrap(), 2);
}
