use crate::config::ConfigError;
use lineage_access::TokenError;
use lineage_agents::DirectoryError;
use lineage_attest::AttestError;
use lineage_ledger::LedgerError;
use lineage_types::ErrorKind;
use lineage_vault::VaultError;
use thiserror::Error;

/// Errors surfaced by the substrate facade.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Attest(#[from] AttestError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Token(err) => err.kind(),
            ServiceError::Directory(err) => err.kind(),
            ServiceError::Ledger(err) => err.kind(),
            ServiceError::Vault(err) => err.kind(),
            ServiceError::Attest(err) => err.kind(),
            ServiceError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Text a frontend can show as-is, naming what the user can do next.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Ledger(LedgerError::AgentNotActive(did)) => format!(
                "agent {did} is not registered or is inactive; reactivate it before recording executions"
            ),
            ServiceError::Ledger(LedgerError::NotFound(id)) => {
                format!("provenance record {id} does not exist")
            }
            ServiceError::Ledger(LedgerError::Unauthorized(_))
            | ServiceError::Token(TokenError::Unauthorized(_)) => {
                "only the deployer can change component wiring".to_string()
            }
            ServiceError::Directory(DirectoryError::AlreadyExists(did)) => {
                format!("agent {did} is already registered; register under a new DID")
            }
            ServiceError::Directory(DirectoryError::NotFound(did)) => {
                format!("agent {did} is not registered")
            }
            ServiceError::Directory(DirectoryError::Unauthorized { did, .. }) => {
                format!("only the owner of agent {did} can change whether it is active")
            }
            ServiceError::Token(TokenError::NotFound(id)) => {
                format!("access token {id} has not been minted")
            }
            ServiceError::Token(TokenError::HolderAlreadyHasToken(holder)) => format!(
                "{holder} already holds an access token; this deployment issues one per holder"
            ),
            ServiceError::Vault(VaultError::Unauthorized { caller, token_id }) => {
                format!("{caller} does not hold access token {token_id}; uploads need the token")
            }
            ServiceError::Vault(VaultError::NotFound(id)) => {
                format!("document {id} does not exist")
            }
            other => format!("internal error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_types::{Did, Principal, TokenId};

    #[test]
    fn kinds_follow_the_component_error() {
        let err: ServiceError = LedgerError::AgentNotActive(Did::new("did:key:abc")).into();
        assert_eq!(err.kind(), ErrorKind::StateError);

        let err: ServiceError = TokenError::NotFound(TokenId(3)).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: ServiceError = ConfigError::Invalid("bad".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn inactive_agent_message_is_actionable() {
        let err: ServiceError = LedgerError::AgentNotActive(Did::new("did:key:abc")).into();
        assert_eq!(
            err.user_message(),
            "agent did:key:abc is not registered or is inactive; reactivate it before recording executions"
        );
    }

    #[test]
    fn display_is_the_component_message() {
        let err: ServiceError = DirectoryError::Unauthorized {
            did: Did::new("did:key:abc"),
            caller: Principal::new("0xB"),
        }
        .into();
        assert_eq!(err.to_string(), "Caller 0xB does not own agent did:key:abc");
        assert!(err.user_message().contains("only the owner"));
    }
}
