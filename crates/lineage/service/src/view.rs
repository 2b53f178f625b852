//! Read-only views of the deployed components.
//!
//! Views expose queries only. Every state change goes through a `Session`,
//! which binds the caller and takes the write gate.

use crate::error::ServiceResult;
use lineage_access::{AccessTokenRegistry, TokenPolicy};
use lineage_agents::AgentDirectory;
use lineage_ledger::{LedgerStatistics, ProvenanceLedger, RecordQuery};
use lineage_types::{
    AccessToken, Agent, Cid, ComponentAddress, Did, Digest, DocumentId, Principal,
    ProvenanceRecord, RecordId, StoredDocument, TokenId,
};
use lineage_vault::DocumentVault;

/// Queries against the access registry.
#[derive(Clone, Copy)]
pub struct AccessView<'a> {
    pub(crate) inner: &'a AccessTokenRegistry,
}

impl AccessView<'_> {
    pub fn address(&self) -> &ComponentAddress {
        self.inner.address()
    }

    pub fn deployer(&self) -> &Principal {
        self.inner.deployer()
    }

    pub fn policy(&self) -> TokenPolicy {
        self.inner.policy()
    }

    pub fn token(&self, token_id: TokenId) -> ServiceResult<AccessToken> {
        Ok(self.inner.token(token_id)?)
    }

    pub fn owner_of(&self, token_id: TokenId) -> ServiceResult<Principal> {
        Ok(self.inner.owner_of(token_id)?)
    }

    pub fn document_ref(&self, token_id: TokenId) -> ServiceResult<Cid> {
        Ok(self.inner.document_ref(token_id)?)
    }

    pub fn has_access(&self, holder: &Principal, token_id: TokenId) -> ServiceResult<bool> {
        Ok(self.inner.has_access(holder, token_id)?)
    }

    pub fn token_count(&self) -> ServiceResult<u64> {
        Ok(self.inner.token_count()?)
    }

    pub fn tokens_of(&self, holder: &Principal) -> ServiceResult<Vec<TokenId>> {
        Ok(self.inner.tokens_of(holder)?)
    }

    pub fn balance_of(&self, holder: &Principal) -> ServiceResult<u64> {
        Ok(self.inner.balance_of(holder)?)
    }

    pub fn token_of(&self, holder: &Principal) -> ServiceResult<Option<TokenId>> {
        Ok(self.inner.token_of(holder)?)
    }

    pub fn is_authenticated(&self, holder: &Principal) -> ServiceResult<bool> {
        Ok(self.inner.is_authenticated(holder)?)
    }

    pub fn agent_directory(&self) -> ServiceResult<Option<ComponentAddress>> {
        Ok(self.inner.agent_directory()?)
    }
}

/// Queries against the agent directory.
#[derive(Clone, Copy)]
pub struct AgentsView<'a> {
    pub(crate) inner: &'a AgentDirectory,
}

impl AgentsView<'_> {
    pub fn address(&self) -> &ComponentAddress {
        self.inner.address()
    }

    pub fn is_active_agent(&self, did: &Did) -> ServiceResult<bool> {
        Ok(self.inner.is_active_agent(did)?)
    }

    pub fn get_agent(&self, did: &Did) -> ServiceResult<Agent> {
        Ok(self.inner.get_agent(did)?)
    }

    pub fn agent_count(&self) -> ServiceResult<usize> {
        Ok(self.inner.agent_count()?)
    }

    pub fn list_agents(&self) -> ServiceResult<Vec<Agent>> {
        Ok(self.inner.list_agents()?)
    }

    pub fn agents_owned_by(&self, owner: &Principal) -> ServiceResult<Vec<Agent>> {
        Ok(self.inner.agents_owned_by(owner)?)
    }
}

/// Queries against the provenance ledger.
#[derive(Clone, Copy)]
pub struct LedgerView<'a> {
    pub(crate) inner: &'a ProvenanceLedger,
}

impl LedgerView<'_> {
    pub fn address(&self) -> &ComponentAddress {
        self.inner.address()
    }

    pub fn owner(&self) -> &Principal {
        self.inner.owner()
    }

    pub fn get_record(&self, id: RecordId) -> ServiceResult<ProvenanceRecord> {
        Ok(self.inner.get_record(id)?)
    }

    pub fn records_by_token(&self, token_id: TokenId) -> ServiceResult<Vec<ProvenanceRecord>> {
        Ok(self.inner.records_by_token(token_id)?)
    }

    pub fn records_by_agent(&self, did: &Did) -> ServiceResult<Vec<ProvenanceRecord>> {
        Ok(self.inner.records_by_agent(did)?)
    }

    pub fn records_by_executor(
        &self,
        executor: &Principal,
    ) -> ServiceResult<Vec<ProvenanceRecord>> {
        Ok(self.inner.records_by_executor(executor)?)
    }

    pub fn query(&self, query: RecordQuery) -> ServiceResult<Vec<ProvenanceRecord>> {
        Ok(self.inner.query(query)?)
    }

    pub fn record_count(&self) -> ServiceResult<u64> {
        Ok(self.inner.record_count()?)
    }

    pub fn head_hash(&self) -> ServiceResult<Option<Digest>> {
        Ok(self.inner.head_hash()?)
    }

    pub fn verify_chain(&self) -> ServiceResult<()> {
        Ok(self.inner.verify_chain()?)
    }

    pub fn statistics(&self) -> ServiceResult<LedgerStatistics> {
        Ok(self.inner.statistics()?)
    }

    pub fn agent_directory(&self) -> ServiceResult<ComponentAddress> {
        Ok(self.inner.agent_directory()?)
    }

    pub fn access_registry(&self) -> ServiceResult<Option<ComponentAddress>> {
        Ok(self.inner.access_registry()?)
    }
}

/// Queries against the document vault.
#[derive(Clone, Copy)]
pub struct VaultView<'a> {
    pub(crate) inner: &'a DocumentVault,
}

impl VaultView<'_> {
    pub fn address(&self) -> &ComponentAddress {
        self.inner.address()
    }

    pub fn access_registry(&self) -> ComponentAddress {
        self.inner.access_registry()
    }

    pub fn get_document(&self, id: DocumentId) -> ServiceResult<StoredDocument> {
        Ok(self.inner.get_document(id)?)
    }

    pub fn documents_of(&self, uploader: &Principal) -> ServiceResult<Vec<DocumentId>> {
        Ok(self.inner.documents_of(uploader)?)
    }

    pub fn documents_for_token(&self, token_id: TokenId) -> ServiceResult<Vec<DocumentId>> {
        Ok(self.inner.documents_for_token(token_id)?)
    }

    pub fn document_count(&self) -> ServiceResult<u64> {
        Ok(self.inner.document_count()?)
    }
}
