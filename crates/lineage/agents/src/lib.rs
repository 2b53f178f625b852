//! Lineage Agents - executor identity directory
//!
//! Every AI execution recorded in the provenance ledger names an executor by
//! DID. This crate owns those identities: who registered them, and whether
//! they are currently allowed to execute.
//!
//! ```text
//!          register_agent
//!  (absent) ────────────► ACTIVE
//!                          │  ▲
//!             deactivate   │  │ reactivate
//!                          ▼  │
//!                        INACTIVE
//! ```

#![deny(unsafe_code)]

use lineage_types::{
    Agent, AgentActivity, CallContext, CapabilityError, Cid, ComponentAddress, Did, ErrorKind,
    Notification, Notifier, Principal,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{info, warn};

/// Directory of executor identities.
///
/// DIDs are unique for the lifetime of the directory: a deactivated agent
/// still occupies its DID.
pub struct AgentDirectory {
    address: ComponentAddress,
    state: RwLock<DirectoryState>,
    notifier: Notifier,
}

#[derive(Default)]
struct DirectoryState {
    agents: HashMap<Did, Agent>,
    registration_order: Vec<Did>,
}

impl AgentDirectory {
    /// Create an empty directory publishing on `notifier`.
    pub fn new(notifier: Notifier) -> Self {
        Self::with_address(ComponentAddress::generate("agents"), notifier)
    }

    pub fn with_address(address: ComponentAddress, notifier: Notifier) -> Self {
        Self {
            address,
            state: RwLock::new(DirectoryState::default()),
            notifier,
        }
    }

    pub fn address(&self) -> &ComponentAddress {
        &self.address
    }

    /// Register a new executor identity owned by the caller.
    pub fn register_agent(
        &self,
        ctx: &CallContext,
        request: RegistrationRequest,
    ) -> Result<Agent, DirectoryError> {
        let mut state = self.state.write().map_err(|_| DirectoryError::LockError)?;

        if state.agents.contains_key(&request.did) {
            warn!(
                did = %request.did,
                caller = %ctx.caller,
                "Agent registration rejected: DID already used"
            );
            return Err(DirectoryError::AlreadyExists(request.did));
        }

        let agent = Agent {
            did: request.did,
            name: request.name,
            metadata_ref: request.metadata_ref,
            owner: ctx.caller.clone(),
            active: true,
            registered_at: ctx.at,
        };

        state.registration_order.push(agent.did.clone());
        state.agents.insert(agent.did.clone(), agent.clone());
        drop(state);

        info!(did = %agent.did, owner = %agent.owner, name = %agent.name, "Agent registered");
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::AgentRegistered {
                did: agent.did.clone(),
                owner: agent.owner.clone(),
                name: agent.name.clone(),
            },
        );

        Ok(agent)
    }

    /// Mark an agent inactive. Only its owner may do so; repeating it is allowed.
    pub fn deactivate_agent(&self, ctx: &CallContext, did: &Did) -> Result<(), DirectoryError> {
        self.set_active(ctx, did, false)?;
        info!(did = %did, caller = %ctx.caller, "Agent deactivated");
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::AgentDeactivated { did: did.clone() },
        );
        Ok(())
    }

    /// Mark an agent active again. Same authorization rule as deactivation.
    pub fn reactivate_agent(&self, ctx: &CallContext, did: &Did) -> Result<(), DirectoryError> {
        self.set_active(ctx, did, true)?;
        info!(did = %did, caller = %ctx.caller, "Agent reactivated");
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::AgentReactivated { did: did.clone() },
        );
        Ok(())
    }

    fn set_active(&self, ctx: &CallContext, did: &Did, active: bool) -> Result<(), DirectoryError> {
        let mut state = self.state.write().map_err(|_| DirectoryError::LockError)?;
        let agent = state
            .agents
            .get_mut(did)
            .ok_or_else(|| DirectoryError::NotFound(did.clone()))?;

        if agent.owner != ctx.caller {
            warn!(
                did = %did,
                caller = %ctx.caller,
                owner = %agent.owner,
                "Agent activation change rejected: caller is not owner"
            );
            return Err(DirectoryError::Unauthorized {
                did: did.clone(),
                caller: ctx.caller.clone(),
            });
        }

        agent.active = active;
        Ok(())
    }

    /// `false` for an unknown DID.
    pub fn is_active_agent(&self, did: &Did) -> Result<bool, DirectoryError> {
        let state = self.state.read().map_err(|_| DirectoryError::LockError)?;
        Ok(state.agents.get(did).is_some_and(|agent| agent.active))
    }

    /// Lookup an agent by DID.
    pub fn get_agent(&self, did: &Did) -> Result<Agent, DirectoryError> {
        let state = self.state.read().map_err(|_| DirectoryError::LockError)?;
        state
            .agents
            .get(did)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(did.clone()))
    }

    pub fn agent_count(&self) -> Result<usize, DirectoryError> {
        let state = self.state.read().map_err(|_| DirectoryError::LockError)?;
        Ok(state.agents.len())
    }

    /// All agents in registration order.
    pub fn list_agents(&self) -> Result<Vec<Agent>, DirectoryError> {
        let state = self.state.read().map_err(|_| DirectoryError::LockError)?;
        Ok(state
            .registration_order
            .iter()
            .filter_map(|did| state.agents.get(did).cloned())
            .collect())
    }

    /// Agents registered by `owner`, in registration order.
    pub fn agents_owned_by(&self, owner: &Principal) -> Result<Vec<Agent>, DirectoryError> {
        Ok(self
            .list_agents()?
            .into_iter()
            .filter(|agent| &agent.owner == owner)
            .collect())
    }
}

impl AgentActivity for AgentDirectory {
    fn address(&self) -> ComponentAddress {
        self.address.clone()
    }

    fn is_active_agent(&self, did: &Did) -> Result<bool, CapabilityError> {
        AgentDirectory::is_active_agent(self, did)
            .map_err(|err| CapabilityError::Unavailable(err.to_string()))
    }
}

/// Request to register a new executor identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub did: Did,
    pub name: String,
    pub metadata_ref: Cid,
}

impl RegistrationRequest {
    pub fn new(
        did: impl Into<String>,
        name: impl Into<String>,
        metadata_ref: impl Into<String>,
    ) -> Self {
        Self {
            did: Did::new(did),
            name: name.into(),
            metadata_ref: Cid::new(metadata_ref),
        }
    }
}

/// Directory errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Agent not found: {0}")]
    NotFound(Did),

    #[error("Agent already registered: {0}")]
    AlreadyExists(Did),

    #[error("Caller {caller} does not own agent {did}")]
    Unauthorized { did: Did, caller: Principal },

    #[error("Lock error")]
    LockError,
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::NotFound(_) => ErrorKind::NotFound,
            DirectoryError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            DirectoryError::Unauthorized { .. } => ErrorKind::Unauthorized,
            DirectoryError::LockError => ErrorKind::Internal,
        }
    }
}
