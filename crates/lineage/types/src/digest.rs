use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// A 32-byte hash value.
///
/// Anchored roots (`input_root`, `execution_root`) are stored exactly as
/// supplied; ledger chain links are BLAKE3 digests computed here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// BLAKE3 over `data`.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// BLAKE3 over the concatenation `left || right`.
    pub fn hash_pair(left: &Digest, right: &Digest) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&left.0);
        hasher.update(&right.0);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest(0x{})", self.to_hex())
    }
}

/// Failure to parse a hex digest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigestParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },
}

impl FromStr for Digest {
    type Err = DigestParseError;

    /// Accepts 64 hex characters with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(trimmed).map_err(|err| DigestParseError::InvalidHex(err.to_string()))?;
        let array: [u8; 32] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| DigestParseError::InvalidLength {
                    expected: Self::LEN,
                    found: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parse_accepts_prefix() {
        let digest = Digest::hash(b"QmIn");
        let printed = digest.to_string();
        assert!(printed.starts_with("0x"));
        assert_eq!(printed.parse::<Digest>().unwrap(), digest);
        assert_eq!(digest.to_hex().parse::<Digest>().unwrap(), digest);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = "0xabcd".parse::<Digest>().unwrap_err();
        assert_eq!(
            err,
            DigestParseError::InvalidLength {
                expected: 32,
                found: 2
            }
        );
        assert!(matches!(
            "zz".parse::<Digest>(),
            Err(DigestParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn serde_uses_prefixed_hex() {
        let digest = Digest::from_bytes([7; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "07".repeat(32)));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }

    #[test]
    fn pair_hash_is_order_sensitive() {
        let a = Digest::hash(b"a");
        let b = Digest::hash(b"b");
        assert_ne!(Digest::hash_pair(&a, &b), Digest::hash_pair(&b, &a));
    }
}
