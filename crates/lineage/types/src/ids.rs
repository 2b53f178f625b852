use serde::{Deserialize, Serialize};

/// Authenticated identity of a caller, supplied by the substrate per call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal(pub String);
impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential access-token id. Never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TokenId(pub u64);
impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential provenance record id, starting at 0.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct RecordId(pub u64);
impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential vault document id, starting at 0.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct DocumentId(pub u64);
impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decentralized identifier naming an executor identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Did(pub String);
impl Did {
    pub fn new(did: impl Into<String>) -> Self {
        Self(did.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque content identifier in an external content-addressed store.
///
/// The format (`Qm...`, `bafy...`, `ipfs://...`) is never interpreted here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cid(pub String);
impl Cid {
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    /// `None` for the empty string, which callers use to mean "no artifact".
    pub fn optional(cid: impl Into<String>) -> Option<Self> {
        let cid = cid.into();
        if cid.is_empty() {
            None
        } else {
            Some(Self(cid))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl std::fmt::Display for Cid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a deployed component instance, used for administrative wiring.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentAddress(pub String);
impl ComponentAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn generate(kind: &str) -> Self {
        Self(format!("{}:{}", kind, uuid::Uuid::new_v4()))
    }
}
impl std::fmt::Display for ComponentAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cid_is_absent() {
        assert_eq!(Cid::optional(""), None);
        assert_eq!(Cid::optional("QmProof"), Some(Cid::new("QmProof")));
    }

    #[test]
    fn generated_addresses_are_distinct_and_tagged() {
        let a = ComponentAddress::generate("agents");
        let b = ComponentAddress::generate("agents");
        assert_ne!(a, b);
        assert!(a.0.starts_with("agents:"));
    }
}
