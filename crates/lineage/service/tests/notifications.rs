use lineage_service::{DerivativeRequest, Substrate, SubstrateConfig};
use lineage_types::{Cid, Did, Digest, Notification, Principal, RecordId, TokenId};

fn deploy() -> Substrate {
    Substrate::deploy(Principal::new("0xdeployer"), SubstrateConfig::default()).unwrap()
}

#[tokio::test]
async fn state_changes_are_published_in_call_order() {
    let substrate = deploy();
    let mut rx = substrate.subscribe();
    let alice = substrate.session(Principal::new("0xA"));
    let did = Did::new("did:key:abc");

    let token = alice.mint(Principal::new("0xA"), Cid::new("QmDoc")).unwrap();
    alice
        .register_agent(did.clone(), "Summarizer", Cid::new("ipfs://meta"))
        .unwrap();
    let record_id = alice
        .record_derivative(DerivativeRequest {
            token_id: token,
            input_cid: Cid::new("QmIn"),
            input_root: Digest::hash(b"h1"),
            output_cid: Cid::new("QmOut"),
            execution_root: Digest::hash(b"h2"),
            trace_cid: Cid::new("QmTrace"),
            agent_did: did.clone(),
            proof_cid: None,
        })
        .unwrap();
    alice.deactivate_agent(&did).unwrap();
    alice.deactivate_agent(&did).unwrap();

    let minted = rx.recv().await.unwrap();
    assert_eq!(&minted.source, substrate.access().address());
    assert_eq!(
        minted.notification,
        Notification::TokenMinted {
            previous_holder: None,
            new_holder: Principal::new("0xA"),
            token_id: TokenId(0),
            document_ref: Cid::new("QmDoc"),
        }
    );

    let registered = rx.recv().await.unwrap();
    assert_eq!(
        registered.notification,
        Notification::AgentRegistered {
            did: did.clone(),
            owner: Principal::new("0xA"),
            name: "Summarizer".into(),
        }
    );

    let recorded = rx.recv().await.unwrap();
    assert_eq!(&recorded.source, substrate.ledger().address());
    match recorded.notification {
        Notification::DerivativeRecorded { record_id: id, record } => {
            assert_eq!(id, record_id);
            assert_eq!(id, RecordId(0));
            assert_eq!(record.agent_did, did);
            assert_eq!(record.executor, Principal::new("0xA"));
        }
        other => panic!("expected DerivativeRecorded, got {:?}", other),
    }

    for _ in 0..2 {
        let deactivated = rx.recv().await.unwrap();
        assert_eq!(
            deactivated.notification,
            Notification::AgentDeactivated { did: did.clone() }
        );
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn notifications_serialize_with_a_type_tag() {
    let substrate = deploy();
    let mut rx = substrate.subscribe();
    substrate
        .session(Principal::new("0xA"))
        .register_agent(Did::new("did:key:abc"), "Summarizer", Cid::new("ipfs://meta"))
        .unwrap();

    let envelope = rx.recv().await.unwrap();
    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["notification"]["type"], "agent_registered");
    assert_eq!(value["notification"]["did"], "did:key:abc");
    assert!(value["event_id"].as_str().unwrap().starts_with("evt-"));
}

#[tokio::test]
async fn publishing_without_subscribers_is_fine() {
    let substrate = deploy();
    substrate
        .session(Principal::new("0xA"))
        .mint(Principal::new("0xA"), Cid::new("QmDoc"))
        .unwrap();
    assert_eq!(substrate.access().token_count().unwrap(), 1);
}
