//! The serializing substrate.
//!
//! Components guard their own state, but ordering across components is the
//! substrate's job: every state-changing call runs under one write gate, and
//! its `CallContext` is stamped inside the gate. Reads never take the gate.

use crate::config::SubstrateConfig;
use crate::error::ServiceResult;
use crate::view::{AccessView, AgentsView, LedgerView, VaultView};
use lineage_access::AccessTokenRegistry;
use lineage_agents::{AgentDirectory, RegistrationRequest};
use lineage_attest::{AuditReport, Auditor, InputCommitment, TraceDocument};
use lineage_ledger::{DerivativeRequest, ProvenanceLedger};
use lineage_types::{
    Agent, AgentActivity, CallContext, Cid, Clock, ComponentAddress, Did, Digest, DocumentId,
    NotificationEnvelope, Notifier, Principal, RecordId, SystemClock, TokenId,
};
use lineage_vault::{DocumentVault, UploadRequest};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::info;

/// One deployment: the access registry, agent directory, provenance ledger
/// and document vault sharing one notification stream, clock and write gate.
pub struct Substrate {
    config: SubstrateConfig,
    deployer: Principal,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
    access: Arc<AccessTokenRegistry>,
    agents: Arc<AgentDirectory>,
    ledger: Arc<ProvenanceLedger>,
    vault: Arc<DocumentVault>,
    gate: Mutex<()>,
}

impl Substrate {
    /// Deploy every component with `deployer` as administrative owner.
    pub fn deploy(deployer: Principal, config: SubstrateConfig) -> ServiceResult<Self> {
        Self::deploy_with_clock(deployer, config, Arc::new(SystemClock))
    }

    /// Deploy with an explicit time source.
    pub fn deploy_with_clock(
        deployer: Principal,
        config: SubstrateConfig,
        clock: Arc<dyn Clock>,
    ) -> ServiceResult<Self> {
        config.validate()?;

        let notifier = Notifier::new(config.notification_capacity);
        let access = Arc::new(AccessTokenRegistry::new(
            deployer.clone(),
            config.token_policy,
            notifier.clone(),
        ));
        let agents = Arc::new(AgentDirectory::new(notifier.clone()));
        let ledger = Arc::new(ProvenanceLedger::new(
            deployer.clone(),
            agents.clone(),
            notifier.clone(),
        ));
        let vault = Arc::new(DocumentVault::new(access.clone(), notifier.clone()));

        let substrate = Self {
            config,
            deployer,
            clock,
            notifier,
            access,
            agents,
            ledger,
            vault,
            gate: Mutex::new(()),
        };

        {
            let _gate = substrate.write_gate();
            let ctx = substrate.context(&substrate.deployer);
            substrate
                .access
                .set_agent_directory(&ctx, substrate.agents.address().clone())?;
            substrate
                .ledger
                .set_access_registry(&ctx, substrate.access.address().clone())?;
        }

        info!(
            deployer = %substrate.deployer,
            access = %substrate.access.address(),
            agents = %substrate.agents.address(),
            ledger = %substrate.ledger.address(),
            vault = %substrate.vault.address(),
            token_policy = ?substrate.config.token_policy,
            "Substrate deployed"
        );

        Ok(substrate)
    }

    /// Bind an authenticated caller.
    pub fn session(&self, caller: Principal) -> Session<'_> {
        Session {
            substrate: self,
            caller,
        }
    }

    /// Subscribe to every component's notifications, in publish order.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEnvelope> {
        self.notifier.subscribe()
    }

    pub fn config(&self) -> &SubstrateConfig {
        &self.config
    }

    pub fn deployer(&self) -> &Principal {
        &self.deployer
    }

    pub fn access(&self) -> AccessView<'_> {
        AccessView { inner: &self.access }
    }

    /// Read-only. Agent lifecycle changes go through a [`Session`]:
    ///
    /// ```compile_fail
    /// use lineage_service::{Substrate, SubstrateConfig};
    /// use lineage_types::{CallContext, Did, Principal};
    ///
    /// let substrate =
    ///     Substrate::deploy(Principal::new("0xdeployer"), SubstrateConfig::default()).unwrap();
    /// let forged = CallContext::now(Principal::new("0xowner"));
    /// substrate
    ///     .agents()
    ///     .deactivate_agent(&forged, &Did::new("did:key:abc"))
    ///     .unwrap();
    /// ```
    pub fn agents(&self) -> AgentsView<'_> {
        AgentsView { inner: &self.agents }
    }

    pub fn ledger(&self) -> LedgerView<'_> {
        LedgerView { inner: &self.ledger }
    }

    pub fn vault(&self) -> VaultView<'_> {
        VaultView { inner: &self.vault }
    }

    /// Check a ledger record against the artifacts fetched from its
    /// `input_cid` and `trace_cid`.
    pub fn audit_record(
        &self,
        record_id: RecordId,
        input: &InputCommitment,
        trace: &TraceDocument,
    ) -> ServiceResult<AuditReport> {
        let record = self.ledger.get_record(record_id)?;
        Ok(Auditor::audit(&record, input, trace)?)
    }

    // The gate guards no data, so a poisoned gate is still usable.
    fn write_gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn context(&self, caller: &Principal) -> CallContext {
        CallContext::new(caller.clone(), self.clock.now())
    }

    fn apply<T>(
        &self,
        caller: &Principal,
        op: impl FnOnce(&CallContext) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let _gate = self.write_gate();
        let ctx = self.context(caller);
        op(&ctx)
    }
}

/// A caller's view of the substrate. State-changing calls are attributed to
/// the bound caller.
pub struct Session<'a> {
    substrate: &'a Substrate,
    caller: Principal,
}

impl Session<'_> {
    pub fn caller(&self) -> &Principal {
        &self.caller
    }

    /// Mint a token to `owner` bound to `document_ref`.
    pub fn mint(&self, owner: Principal, document_ref: Cid) -> ServiceResult<TokenId> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.access.mint(ctx, owner, document_ref)?)
        })
    }

    /// `true` iff the bound caller holds `token_id`.
    pub fn has_access(&self, token_id: TokenId) -> ServiceResult<bool> {
        Ok(self.substrate.access.has_access(&self.caller, token_id)?)
    }

    pub fn is_authenticated(&self) -> ServiceResult<bool> {
        Ok(self.substrate.access.is_authenticated(&self.caller)?)
    }

    pub fn register_agent(
        &self,
        did: Did,
        name: impl Into<String>,
        metadata_ref: Cid,
    ) -> ServiceResult<Agent> {
        let request = RegistrationRequest {
            did,
            name: name.into(),
            metadata_ref,
        };
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.agents.register_agent(ctx, request)?)
        })
    }

    pub fn deactivate_agent(&self, did: &Did) -> ServiceResult<()> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.agents.deactivate_agent(ctx, did)?)
        })
    }

    pub fn reactivate_agent(&self, did: &Did) -> ServiceResult<()> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.agents.reactivate_agent(ctx, did)?)
        })
    }

    /// Record an execution with the bound caller as executor.
    pub fn record_derivative(&self, request: DerivativeRequest) -> ServiceResult<RecordId> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.ledger.record_derivative(ctx, request)?)
        })
    }

    pub fn upload_document(&self, request: UploadRequest) -> ServiceResult<DocumentId> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.vault.upload_document(ctx, request)?)
        })
    }

    /// Publishes the outcome, so it is sequenced like a write.
    pub fn verify_document(&self, id: DocumentId, provided_hash: &Digest) -> ServiceResult<bool> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.vault.verify_document(ctx, id, provided_hash)?)
        })
    }

    /// Point the access registry at an agent directory. Deployer only.
    pub fn set_registry_agent_directory(&self, directory: ComponentAddress) -> ServiceResult<()> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.access.set_agent_directory(ctx, directory)?)
        })
    }

    /// Point the ledger's recording guard at another directory. Deployer only.
    pub fn set_ledger_agent_directory(&self, agents: Arc<dyn AgentActivity>) -> ServiceResult<()> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.ledger.set_agent_directory(ctx, agents)?)
        })
    }

    /// Record which registry issues the ledger's token ids. Deployer only.
    pub fn set_ledger_access_registry(&self, registry: ComponentAddress) -> ServiceResult<()> {
        self.substrate.apply(&self.caller, |ctx| {
            Ok(self.substrate.ledger.set_access_registry(ctx, registry)?)
        })
    }
}
