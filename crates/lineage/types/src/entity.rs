use crate::{Cid, Did, Digest, DocumentId, Principal, RecordId, TokenId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A possession token bound at mint time to one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: TokenId,
    pub owner: Principal,
    pub document_ref: Cid,
    pub minted_at: DateTime<Utc>,
}

/// A registered AI-executor identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub did: Did,
    pub name: String,
    pub metadata_ref: Cid,
    pub owner: Principal,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

/// One immutable AI execution entry.
///
/// `token_id` and `agent_did` are copied identifiers, not live references:
/// deactivating the agent later does not touch this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub id: RecordId,
    pub token_id: TokenId,
    pub input_cid: Cid,
    pub input_root: Digest,
    pub output_cid: Cid,
    pub execution_root: Digest,
    pub trace_cid: Cid,
    pub agent_did: Did,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_cid: Option<Cid>,
    pub executor: Principal,
    pub timestamp: DateTime<Utc>,
    /// Hash of the record with id `id - 1`; `None` for the first record.
    pub previous_hash: Option<Digest>,
    pub record_hash: Digest,
}

/// Metadata for a document uploaded behind a token check. Bytes live in the
/// external content-addressed store under `cid`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub cid: Cid,
    pub document_hash: Digest,
    pub uploader: Principal,
    pub token_id: TokenId,
    pub file_name: String,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
}
