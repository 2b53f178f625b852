//! Lineage Vault - documents behind a token check
//!
//! The vault records metadata about documents whose bytes live in an external
//! content-addressed store. Uploading requires holding the named access
//! token; reading and verifying do not.

#![deny(unsafe_code)]

use lineage_types::{
    CallContext, CapabilityError, Cid, ComponentAddress, Digest, DocumentId, ErrorKind,
    Notification, Notifier, Principal, StoredDocument, TokenHolders, TokenId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// Metadata supplied with an upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub token_id: TokenId,
    pub cid: Cid,
    pub document_hash: Digest,
    pub file_name: String,
    pub file_size: u64,
}

/// Registry of uploaded documents.
pub struct DocumentVault {
    address: ComponentAddress,
    holders: Arc<dyn TokenHolders>,
    state: RwLock<VaultState>,
    notifier: Notifier,
}

#[derive(Default)]
struct VaultState {
    documents: Vec<StoredDocument>,
    by_uploader: HashMap<Principal, Vec<DocumentId>>,
    by_token: HashMap<TokenId, Vec<DocumentId>>,
}

impl VaultState {
    fn document(&self, id: DocumentId) -> Option<&StoredDocument> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.documents.get(index))
    }
}

impl DocumentVault {
    pub fn new(holders: Arc<dyn TokenHolders>, notifier: Notifier) -> Self {
        Self {
            address: ComponentAddress::generate("vault"),
            holders,
            state: RwLock::new(VaultState::default()),
            notifier,
        }
    }

    pub fn address(&self) -> &ComponentAddress {
        &self.address
    }

    /// Address of the registry whose tokens gate uploads.
    pub fn access_registry(&self) -> ComponentAddress {
        self.holders.address()
    }

    /// Record a document under `request.token_id`.
    ///
    /// Fails with `Unauthorized` unless the caller holds that token.
    pub fn upload_document(
        &self,
        ctx: &CallContext,
        request: UploadRequest,
    ) -> Result<DocumentId, VaultError> {
        if !self.holders.has_access(&ctx.caller, request.token_id)? {
            warn!(
                caller = %ctx.caller,
                token_id = %request.token_id,
                "Upload rejected: caller does not hold token"
            );
            return Err(VaultError::Unauthorized {
                caller: ctx.caller.clone(),
                token_id: request.token_id,
            });
        }

        let mut state = self.state.write().map_err(|_| VaultError::LockError)?;
        let document_id = DocumentId(state.documents.len() as u64);
        let document = StoredDocument {
            id: document_id,
            cid: request.cid,
            document_hash: request.document_hash,
            uploader: ctx.caller.clone(),
            token_id: request.token_id,
            file_name: request.file_name,
            file_size: request.file_size,
            uploaded_at: ctx.at,
        };
        state
            .by_uploader
            .entry(ctx.caller.clone())
            .or_default()
            .push(document_id);
        state
            .by_token
            .entry(request.token_id)
            .or_default()
            .push(document_id);
        state.documents.push(document.clone());
        drop(state);

        info!(
            document_id = %document_id,
            token_id = %document.token_id,
            caller = %ctx.caller,
            cid = %document.cid,
            "Document uploaded"
        );
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::DocumentUploaded {
                document_id,
                uploader: document.uploader,
                token_id: document.token_id,
                cid: document.cid,
                document_hash: document.document_hash,
                file_name: document.file_name,
            },
        );

        Ok(document_id)
    }

    pub fn get_document(&self, id: DocumentId) -> Result<StoredDocument, VaultError> {
        let state = self.state.read().map_err(|_| VaultError::LockError)?;
        state
            .document(id)
            .cloned()
            .ok_or(VaultError::NotFound(id))
    }

    /// Documents uploaded by `uploader`, ascending.
    pub fn documents_of(&self, uploader: &Principal) -> Result<Vec<DocumentId>, VaultError> {
        let state = self.state.read().map_err(|_| VaultError::LockError)?;
        Ok(state.by_uploader.get(uploader).cloned().unwrap_or_default())
    }

    /// Documents uploaded under `token_id`, ascending.
    pub fn documents_for_token(&self, token_id: TokenId) -> Result<Vec<DocumentId>, VaultError> {
        let state = self.state.read().map_err(|_| VaultError::LockError)?;
        Ok(state.by_token.get(&token_id).cloned().unwrap_or_default())
    }

    /// Compare `provided_hash` with the stored hash and publish the outcome.
    pub fn verify_document(
        &self,
        ctx: &CallContext,
        id: DocumentId,
        provided_hash: &Digest,
    ) -> Result<bool, VaultError> {
        let document = self.get_document(id)?;
        let valid = &document.document_hash == provided_hash;

        info!(
            document_id = %id,
            caller = %ctx.caller,
            valid,
            "Document verified"
        );
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::DocumentVerified {
                document_id: id,
                verifier: ctx.caller.clone(),
                valid,
            },
        );

        Ok(valid)
    }

    pub fn document_count(&self) -> Result<u64, VaultError> {
        let state = self.state.read().map_err(|_| VaultError::LockError)?;
        Ok(state.documents.len() as u64)
    }
}

/// Vault errors.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Caller {caller} does not hold token {token_id}")]
    Unauthorized { caller: Principal, token_id: TokenId },

    #[error("Access registry unavailable: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Lock error")]
    LockError,
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::NotFound(_) => ErrorKind::NotFound,
            VaultError::Unauthorized { .. } => ErrorKind::Unauthorized,
            VaultError::Capability(_) | VaultError::LockError => ErrorKind::Internal,
        }
    }
}
