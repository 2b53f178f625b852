use lineage_types::ErrorKind;
use thiserror::Error;

/// Attestation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttestError {
    #[error("Leaf index {index} out of range for {leaf_count} leaves")]
    LeafOutOfRange { index: usize, leaf_count: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AttestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttestError::LeafOutOfRange { .. } => ErrorKind::NotFound,
            AttestError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for AttestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
