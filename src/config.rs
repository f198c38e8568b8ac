//! Deployment configuration
//!
//! Delegate keys and the recovery window are injected into each registry and
//! wallet at construction. This module loads them from JSON.
//!
//! ```json
//! {
//!   "registry": { "admin": "<64 hex chars>" },
//!   "wallet": {
//!     "user": "<64 hex chars>",
//!     "recovery": { "start_recovery": 100, "end_recovery": 200 }
//!   }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::member::PublicKey;
use crate::wallet::RecoveryPreconditions;
use crate::Result;

/// Guardian registry settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianRegistryConfig {
    /// Delegate key allowed to register guardians
    pub admin: PublicKey,
}

/// Wallet settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Delegate key allowed to enroll guardians
    pub user: PublicKey,
    /// Recovery window; always open when omitted
    #[serde(default)]
    pub recovery: RecoveryPreconditions,
}

/// A guardian registry and one wallet referencing it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Registry settings
    pub registry: GuardianRegistryConfig,
    /// Wallet settings
    pub wallet: WalletConfig,
}

impl DeploymentConfig {
    /// Parses a JSON document
    ///
    /// # Errors
    /// * `Err(Error::Config(ConfigError::Parse))` - If the document is malformed, a key is not
    ///   32 hex bytes, or the recovery window is inverted
    ///
    /// # Examples
    ///
    /// ```rust
    /// use merkle_guardian::config::DeploymentConfig;
    /// use merkle_guardian::wallet::RecoveryPreconditions;
    ///
    /// let json = format!(
    ///     r#"{{"registry":{{"admin":"{}"}},"wallet":{{"user":"{}"}}}}"#,
    ///     "01".repeat(32),
    ///     "02".repeat(32),
    /// );
    /// let config = DeploymentConfig::from_json(&json)?;
    /// assert_eq!(config.wallet.recovery, RecoveryPreconditions::always_open());
    /// # Ok::<(), merkle_guardian::Error>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        debug!(
            admin = %config.registry.admin,
            user = %config.wallet.user,
            start_recovery = config.wallet.recovery.start_recovery(),
            end_recovery = config.wallet.recovery.end_recovery(),
            "loaded deployment config"
        );
        Ok(config)
    }

    /// Reads and parses a JSON file
    ///
    /// # Errors
    /// * `Err(Error::Config(ConfigError::Io))` - If the file cannot be read
    /// * `Err(Error::Config(ConfigError::Parse))` - See [`DeploymentConfig::from_json`]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Serializes to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::key;

    fn sample() -> DeploymentConfig {
        DeploymentConfig {
            registry: GuardianRegistryConfig { admin: key(1) },
            wallet: WalletConfig {
                user: key(2),
                recovery: RecoveryPreconditions::new(100, 200).expect("ordered"),
            },
        }
    }

    #[test]
    fn test_from_json() {
        let json = sample().to_json().expect("serializes");

        let config = DeploymentConfig::from_json(&json).expect("valid config");

        assert_eq!(config, sample());
    }

    #[test]
    fn test_from_json_rejects_inverted_window() {
        let json = format!(
            r#"{{"registry":{{"admin":"{}"}},"wallet":{{"user":"{}","recovery":{{"start_recovery":5,"end_recovery":1}}}}}}"#,
            "01".repeat(32),
            "02".repeat(32),
        );

        let result = DeploymentConfig::from_json(&json);

        assert!(matches!(result, Err(crate::Error::Config(ConfigError::Parse(message))) if message.contains("start 5 > end 1")));
    }

    #[test]
    fn test_from_json_rejects_bad_key() {
        let json = r#"{"registry":{"admin":"abcd"},"wallet":{"user":"abcd"}}"#;

        let result = DeploymentConfig::from_json(json);

        assert!(matches!(result, Err(crate::Error::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!("merkle-guardian-{}.json", std::process::id()));
        fs::write(&path, sample().to_json().expect("serializes")).expect("writable temp dir");

        let loaded = DeploymentConfig::from_path(&path);
        let missing = DeploymentConfig::from_path(path.with_extension("missing"));
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(loaded, Ok(sample()));
        assert!(matches!(missing, Err(crate::Error::Config(ConfigError::Io(_)))));
    }
}
