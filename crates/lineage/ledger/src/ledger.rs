use crate::chain;
use crate::memory::InMemoryRecordStore;
use crate::query::{LedgerStatistics, RecordQuery};
use crate::store::{apply_window, NewRecord, QueryWindow, RecordStore};
use crate::LedgerError;
use lineage_types::{
    AgentActivity, CallContext, Cid, ComponentAddress, Did, Digest, Notification, Notifier,
    Principal, ProvenanceRecord, RecordId, TokenId,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Everything a caller supplies to record one execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivativeRequest {
    pub token_id: TokenId,
    pub input_cid: Cid,
    pub input_root: Digest,
    pub output_cid: Cid,
    pub execution_root: Digest,
    pub trace_cid: Cid,
    pub agent_did: Did,
    pub proof_cid: Option<Cid>,
}

/// The provenance ledger facade.
///
/// Recording is guarded by one cross-component check: the agent must be
/// active in the wired directory at the moment of recording. Persistence is
/// delegated to a `RecordStore`.
pub struct ProvenanceLedger {
    address: ComponentAddress,
    owner: Principal,
    store: Arc<dyn RecordStore>,
    wiring: RwLock<Wiring>,
    notifier: Notifier,
}

struct Wiring {
    agents: Arc<dyn AgentActivity>,
    access_registry: Option<ComponentAddress>,
}

impl ProvenanceLedger {
    /// Create a ledger backed by in-memory storage.
    pub fn new(owner: Principal, agents: Arc<dyn AgentActivity>, notifier: Notifier) -> Self {
        Self::with_store(owner, agents, Arc::new(InMemoryRecordStore::new()), notifier)
    }

    /// Create a ledger backed by an explicit store.
    pub fn with_store(
        owner: Principal,
        agents: Arc<dyn AgentActivity>,
        store: Arc<dyn RecordStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            address: ComponentAddress::generate("ledger"),
            owner,
            store,
            wiring: RwLock::new(Wiring {
                agents,
                access_registry: None,
            }),
            notifier,
        }
    }

    pub fn address(&self) -> &ComponentAddress {
        &self.address
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Access the underlying store.
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Record one AI execution and return its id.
    ///
    /// Fails with `AgentNotActive` when the agent is unknown or inactive; in
    /// that case nothing is stored and nothing is published. `token_id` is
    /// not checked against the access registry: any value is accepted.
    pub fn record_derivative(
        &self,
        ctx: &CallContext,
        request: DerivativeRequest,
    ) -> Result<RecordId, LedgerError> {
        let agents = {
            let wiring = self.wiring.read().map_err(|_| lock_error())?;
            Arc::clone(&wiring.agents)
        };

        if !agents.is_active_agent(&request.agent_did)? {
            warn!(
                did = %request.agent_did,
                caller = %ctx.caller,
                token_id = %request.token_id,
                "Derivative rejected: agent not registered or inactive"
            );
            return Err(LedgerError::AgentNotActive(request.agent_did));
        }

        let record = self.store.append(NewRecord {
            token_id: request.token_id,
            input_cid: request.input_cid,
            input_root: request.input_root,
            output_cid: request.output_cid,
            execution_root: request.execution_root,
            trace_cid: request.trace_cid,
            agent_did: request.agent_did,
            proof_cid: request.proof_cid,
            executor: ctx.caller.clone(),
            timestamp: ctx.at,
        })?;

        info!(
            record_id = %record.id,
            token_id = %record.token_id,
            did = %record.agent_did,
            executor = %record.executor,
            record_hash = %record.record_hash,
            "Derivative recorded"
        );
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::DerivativeRecorded {
                record_id: record.id,
                record: Box::new(record.clone()),
            },
        );

        Ok(record.id)
    }

    /// Get a record by id.
    pub fn get_record(&self, id: RecordId) -> Result<ProvenanceRecord, LedgerError> {
        self.store.get(id)?.ok_or(LedgerError::NotFound(id))
    }

    /// All records for a token, in creation order.
    pub fn records_by_token(
        &self,
        token_id: TokenId,
    ) -> Result<Vec<ProvenanceRecord>, LedgerError> {
        Ok(self.store.by_token(token_id)?)
    }

    /// All records naming an agent, in creation order.
    pub fn records_by_agent(&self, did: &Did) -> Result<Vec<ProvenanceRecord>, LedgerError> {
        self.query(RecordQuery {
            agent_did: Some(did.clone()),
            ..Default::default()
        })
    }

    /// All records submitted by an executor, in creation order.
    pub fn records_by_executor(
        &self,
        executor: &Principal,
    ) -> Result<Vec<ProvenanceRecord>, LedgerError> {
        self.query(RecordQuery {
            executor: Some(executor.clone()),
            ..Default::default()
        })
    }

    /// Query records with filters, in creation order.
    pub fn query(&self, query: RecordQuery) -> Result<Vec<ProvenanceRecord>, LedgerError> {
        let candidates = match query.token_id {
            Some(token_id) => self.store.by_token(token_id)?,
            None => self.store.list(QueryWindow::all())?,
        };

        let results: Vec<_> = candidates
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();

        Ok(apply_window(results, query.window()))
    }

    /// Total number of records. Never decreases.
    pub fn record_count(&self) -> Result<u64, LedgerError> {
        Ok(self.store.record_count()?)
    }

    /// Hash of the latest record.
    pub fn head_hash(&self) -> Result<Option<Digest>, LedgerError> {
        Ok(self.store.head_hash()?)
    }

    /// Re-derive every hash link from genesis.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        let records = self.store.list(QueryWindow::all())?;
        chain::verify_chain(&records)
    }

    /// Get statistics about the ledger.
    pub fn statistics(&self) -> Result<LedgerStatistics, LedgerError> {
        let records = self.store.list(QueryWindow::all())?;
        Ok(LedgerStatistics::from_records(&records))
    }

    /// Point the ledger at a different agent directory. Owner only.
    pub fn set_agent_directory(
        &self,
        ctx: &CallContext,
        agents: Arc<dyn AgentActivity>,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(ctx)?;

        let directory = agents.address();
        let mut wiring = self.wiring.write().map_err(|_| lock_error())?;
        wiring.agents = agents;
        drop(wiring);

        info!(directory = %directory, "Ledger wired to agent directory");
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::AgentDirectoryWired { directory },
        );
        Ok(())
    }

    /// Record which access registry issues the token ids this ledger stores.
    /// Owner only. The address is informational; it is not consulted on record.
    pub fn set_access_registry(
        &self,
        ctx: &CallContext,
        registry: ComponentAddress,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(ctx)?;

        let mut wiring = self.wiring.write().map_err(|_| lock_error())?;
        wiring.access_registry = Some(registry.clone());
        drop(wiring);

        info!(registry = %registry, "Ledger wired to access registry");
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::AccessRegistryWired { registry },
        );
        Ok(())
    }

    pub fn agent_directory(&self) -> Result<ComponentAddress, LedgerError> {
        let wiring = self.wiring.read().map_err(|_| lock_error())?;
        Ok(wiring.agents.address())
    }

    pub fn access_registry(&self) -> Result<Option<ComponentAddress>, LedgerError> {
        let wiring = self.wiring.read().map_err(|_| lock_error())?;
        Ok(wiring.access_registry.clone())
    }

    fn ensure_owner(&self, ctx: &CallContext) -> Result<(), LedgerError> {
        if ctx.caller != self.owner {
            warn!(
                caller = %ctx.caller,
                owner = %self.owner,
                "Ledger wiring rejected: caller is not owner"
            );
            return Err(LedgerError::Unauthorized(ctx.caller.clone()));
        }
        Ok(())
    }
}

fn lock_error() -> LedgerError {
    LedgerError::Backend("ledger wiring lock poisoned".to_string())
}
