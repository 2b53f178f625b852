use lineage_types::{CapabilityError, Did, ErrorKind, Principal, RecordId};
use thiserror::Error;

/// Result type for record storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Agent not registered or inactive: {0}")]
    AgentNotActive(Did),

    #[error("Caller {0} is not the ledger owner")]
    Unauthorized(Principal),

    #[error("Chain integrity violation at record {record_id}: {reason}")]
    IntegrityViolation { record_id: u64, reason: String },

    #[error("Agent directory unavailable: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::AgentNotActive(_) => ErrorKind::StateError,
            LedgerError::Unauthorized(_) => ErrorKind::Unauthorized,
            LedgerError::IntegrityViolation { .. }
            | LedgerError::Capability(_)
            | LedgerError::Backend(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Serialization(msg) | StoreError::Backend(msg) => Self::Backend(msg),
        }
    }
}
