//! Account identity keys
//!
//! Key material is owned by an external key-management collaborator. This
//! crate only compares public identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::errors::{ConfigError, PreconditionError};
use crate::Bytes32;

/// Public identity of an account
///
/// The all-zero key is the distinguished [`PublicKey::EMPTY`] value meaning
/// "no member".
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey(Bytes32);

impl PublicKey {
    /// The "no member" key
    pub const EMPTY: Self = Self([0u8; 32]);

    /// Wraps raw key bytes
    pub const fn from_bytes(bytes: Bytes32) -> Self { Self(bytes) }

    /// Returns the raw key bytes
    pub fn as_bytes(&self) -> &Bytes32 { &self.0 }

    /// Returns `true` for the "no member" key
    pub fn is_empty(&self) -> bool { *self == Self::EMPTY }

    /// Fails with `Unauthorized` unless `caller` is this delegate key
    pub(crate) fn ensure_delegate_of(&self, caller: &PublicKey) -> crate::Result<()> {
        if caller != self {
            warn!(%caller, "unauthorized caller");
            return Err(PreconditionError::Unauthorized { caller: *caller }.into());
        }
        Ok(())
    }
}

impl From<Bytes32> for PublicKey {
    fn from(bytes: Bytes32) -> Self { Self(bytes) }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&hex::encode(self.0)) }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| ConfigError::InvalidPublicKey(e.to_string()))?;
        let bytes: Bytes32 = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ConfigError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        encoded.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(PublicKey::EMPTY.is_empty());
        assert!(PublicKey::default().is_empty());
        assert!(!PublicKey::from_bytes([1u8; 32]).is_empty());
    }

    #[test]
    fn test_ensure_delegate_of() {
        let admin = PublicKey::from_bytes([1u8; 32]);
        let intruder = PublicKey::from_bytes([2u8; 32]);

        let allowed = admin.ensure_delegate_of(&admin);
        let denied = admin.ensure_delegate_of(&intruder);

        assert!(allowed.is_ok());
        assert_eq!(
            denied,
            Err(crate::Error::Precondition(PreconditionError::Unauthorized { caller: intruder }))
        );
    }

    #[test]
    fn test_display_and_parse() {
        let key = PublicKey::from_bytes([0xab; 32]);

        let encoded = key.to_string();
        let parsed: PublicKey = encoded.parse().expect("valid hex");
        let prefixed: PublicKey = format!("0x{encoded}").parse().expect("valid hex");

        assert_eq!(encoded, "ab".repeat(32));
        assert_eq!(parsed, key);
        assert_eq!(prefixed, key);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let not_hex = "zz".parse::<PublicKey>();
        let too_short = "abcd".parse::<PublicKey>();

        assert!(matches!(not_hex, Err(crate::Error::Config(ConfigError::InvalidPublicKey(_)))));
        assert_eq!(
            too_short,
            Err(crate::Error::Config(ConfigError::InvalidPublicKey(
                "expected 32 bytes, got 2".to_string()
            )))
        );
    }

    #[test]
    fn test_serde() {
        let key = PublicKey::from_bytes([7u8; 32]);

        let json = serde_json::to_string(&key).expect("serializes");
        let decoded: PublicKey = serde_json::from_str(&json).expect("deserializes");

        assert_eq!(json, format!("\"{}\"", "07".repeat(32)));
        assert_eq!(decoded, key);
    }
}
