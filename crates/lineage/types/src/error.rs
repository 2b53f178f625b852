use serde::{Deserialize, Serialize};

/// Failure taxonomy shared by every component error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// An id or DID that was never created.
    NotFound,
    /// A DID (or, under a one-per-holder policy, a holder) already used.
    AlreadyExists,
    /// Caller is not the recognized owner.
    Unauthorized,
    /// Preconditions on a referenced entity's state are unmet.
    StateError,
    /// Lock poisoning or storage backend faults. Never produced by a guard.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::StateError => "state_error",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}
