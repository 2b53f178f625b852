//! Lineage Access - possession tokens bound to documents
//!
//! A token is minted to a holder and bound, for its whole lifetime, to one
//! content identifier. Holding the token is the access check: nothing else
//! about the caller is consulted.

#![deny(unsafe_code)]

use lineage_types::{
    AccessToken, CallContext, CapabilityError, Cid, ComponentAddress, ErrorKind, Notification,
    Notifier, Principal, TokenHolders, TokenId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{info, warn};

/// How many tokens one holder may receive. Fixed per deployment.
///
/// Tokens are non-transferable under either policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPolicy {
    /// Any number of tokens per holder.
    #[default]
    Unlimited,
    /// At most one token per holder; a second mint fails with AlreadyExists.
    OnePerHolder,
}

/// Registry of access tokens.
pub struct AccessTokenRegistry {
    address: ComponentAddress,
    deployer: Principal,
    policy: TokenPolicy,
    state: RwLock<RegistryState>,
    notifier: Notifier,
}

#[derive(Default)]
struct RegistryState {
    /// Indexed by token id; ids are positions.
    tokens: Vec<AccessToken>,
    by_holder: HashMap<Principal, Vec<TokenId>>,
    agent_directory: Option<ComponentAddress>,
}

impl RegistryState {
    /// Ids that do not fit the platform index are unminted.
    fn token(&self, token_id: TokenId) -> Option<&AccessToken> {
        usize::try_from(token_id.0)
            .ok()
            .and_then(|index| self.tokens.get(index))
    }
}

impl AccessTokenRegistry {
    /// Create a registry whose administrative owner is `deployer`.
    pub fn new(deployer: Principal, policy: TokenPolicy, notifier: Notifier) -> Self {
        Self::with_address(
            ComponentAddress::generate("access"),
            deployer,
            policy,
            notifier,
        )
    }

    pub fn with_address(
        address: ComponentAddress,
        deployer: Principal,
        policy: TokenPolicy,
        notifier: Notifier,
    ) -> Self {
        Self {
            address,
            deployer,
            policy,
            state: RwLock::new(RegistryState::default()),
            notifier,
        }
    }

    pub fn address(&self) -> &ComponentAddress {
        &self.address
    }

    pub fn deployer(&self) -> &Principal {
        &self.deployer
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Mint the next token to `owner`, bound to `document_ref`.
    ///
    /// Anyone may mint. Returns the new token id.
    pub fn mint(
        &self,
        ctx: &CallContext,
        owner: Principal,
        document_ref: Cid,
    ) -> Result<TokenId, TokenError> {
        let mut state = self.state.write().map_err(|_| TokenError::LockError)?;

        if self.policy == TokenPolicy::OnePerHolder
            && state.by_holder.get(&owner).is_some_and(|ids| !ids.is_empty())
        {
            warn!(
                holder = %owner,
                caller = %ctx.caller,
                "Mint rejected: holder already has a token"
            );
            return Err(TokenError::HolderAlreadyHasToken(owner));
        }

        let token_id = TokenId(state.tokens.len() as u64);
        state.tokens.push(AccessToken {
            id: token_id,
            owner: owner.clone(),
            document_ref: document_ref.clone(),
            minted_at: ctx.at,
        });
        state
            .by_holder
            .entry(owner.clone())
            .or_default()
            .push(token_id);
        drop(state);

        info!(
            token_id = %token_id,
            holder = %owner,
            caller = %ctx.caller,
            document_ref = %document_ref,
            "Access token minted"
        );
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::TokenMinted {
                previous_holder: None,
                new_holder: owner,
                token_id,
                document_ref,
            },
        );

        Ok(token_id)
    }

    /// Full token entry.
    pub fn token(&self, token_id: TokenId) -> Result<AccessToken, TokenError> {
        let state = self.state.read().map_err(|_| TokenError::LockError)?;
        state
            .token(token_id)
            .cloned()
            .ok_or(TokenError::NotFound(token_id))
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<Principal, TokenError> {
        Ok(self.token(token_id)?.owner)
    }

    /// The content identifier bound at mint time.
    pub fn document_ref(&self, token_id: TokenId) -> Result<Cid, TokenError> {
        Ok(self.token(token_id)?.document_ref)
    }

    /// `true` iff `caller` owns `token_id`; `false` for an unminted token.
    pub fn has_access(&self, caller: &Principal, token_id: TokenId) -> Result<bool, TokenError> {
        let state = self.state.read().map_err(|_| TokenError::LockError)?;
        Ok(state
            .token(token_id)
            .is_some_and(|token| &token.owner == caller))
    }

    pub fn token_count(&self) -> Result<u64, TokenError> {
        let state = self.state.read().map_err(|_| TokenError::LockError)?;
        Ok(state.tokens.len() as u64)
    }

    /// Token ids held by `holder`, ascending.
    pub fn tokens_of(&self, holder: &Principal) -> Result<Vec<TokenId>, TokenError> {
        let state = self.state.read().map_err(|_| TokenError::LockError)?;
        Ok(state.by_holder.get(holder).cloned().unwrap_or_default())
    }

    pub fn balance_of(&self, holder: &Principal) -> Result<u64, TokenError> {
        Ok(self.tokens_of(holder)?.len() as u64)
    }

    /// The holder's earliest token.
    pub fn token_of(&self, holder: &Principal) -> Result<Option<TokenId>, TokenError> {
        Ok(self.tokens_of(holder)?.first().copied())
    }

    /// `true` iff the holder holds at least one token.
    pub fn is_authenticated(&self, holder: &Principal) -> Result<bool, TokenError> {
        Ok(self.token_of(holder)?.is_some())
    }

    /// Point the registry at an agent directory. Deployer only.
    pub fn set_agent_directory(
        &self,
        ctx: &CallContext,
        directory: ComponentAddress,
    ) -> Result<(), TokenError> {
        if ctx.caller != self.deployer {
            warn!(
                caller = %ctx.caller,
                deployer = %self.deployer,
                "Registry wiring rejected: caller is not deployer"
            );
            return Err(TokenError::Unauthorized(ctx.caller.clone()));
        }

        let mut state = self.state.write().map_err(|_| TokenError::LockError)?;
        state.agent_directory = Some(directory.clone());
        drop(state);

        info!(directory = %directory, "Access registry wired to agent directory");
        self.notifier.publish(
            &self.address,
            ctx.at,
            Notification::AgentDirectoryWired { directory },
        );
        Ok(())
    }

    pub fn agent_directory(&self) -> Result<Option<ComponentAddress>, TokenError> {
        let state = self.state.read().map_err(|_| TokenError::LockError)?;
        Ok(state.agent_directory.clone())
    }
}

impl TokenHolders for AccessTokenRegistry {
    fn address(&self) -> ComponentAddress {
        self.address.clone()
    }

    fn has_access(&self, caller: &Principal, token_id: TokenId) -> Result<bool, CapabilityError> {
        AccessTokenRegistry::has_access(self, caller, token_id)
            .map_err(|err| CapabilityError::Unavailable(err.to_string()))
    }

    fn token_of(&self, holder: &Principal) -> Result<Option<TokenId>, CapabilityError> {
        AccessTokenRegistry::token_of(self, holder)
            .map_err(|err| CapabilityError::Unavailable(err.to_string()))
    }
}

/// Registry errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token not found: {0}")]
    NotFound(TokenId),

    #[error("Holder {0} already has a token")]
    HolderAlreadyHasToken(Principal),

    #[error("Caller {0} is not the registry deployer")]
    Unauthorized(Principal),

    #[error("Lock error")]
    LockError,
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::NotFound(_) => ErrorKind::NotFound,
            TokenError::HolderAlreadyHasToken(_) => ErrorKind::AlreadyExists,
            TokenError::Unauthorized(_) => ErrorKind::Unauthorized,
            TokenError::LockError => ErrorKind::Internal,
        }
    }
}
