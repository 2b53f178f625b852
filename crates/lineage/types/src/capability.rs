//! Read-only capabilities one component grants another.
//!
//! The ledger only ever needs to ask "is this agent active?", and the vault
//! only ever needs to ask "does this caller hold this token?". Neither holds a
//! general handle on the component behind the capability.

use crate::{ComponentAddress, Did, Principal, TokenId};
use thiserror::Error;

/// Failure to answer a capability query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),
}

/// Answers whether an executor identity is currently active.
pub trait AgentActivity: Send + Sync {
    fn address(&self) -> ComponentAddress;

    /// `false` for an unknown DID.
    fn is_active_agent(&self, did: &Did) -> Result<bool, CapabilityError>;
}

/// Answers possession questions about access tokens.
pub trait TokenHolders: Send + Sync {
    fn address(&self) -> ComponentAddress;

    /// `false` for an unminted token.
    fn has_access(&self, caller: &Principal, token_id: TokenId) -> Result<bool, CapabilityError>;

    /// The holder's earliest token, if any.
    fn token_of(&self, holder: &Principal) -> Result<Option<TokenId>, CapabilityError>;
}
