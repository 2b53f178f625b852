//! Substrate configuration

use lineage_access::TokenPolicy;
use lineage_types::DEFAULT_NOTIFICATION_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Deployment configuration for one substrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Mint policy of the access registry.
    pub token_policy: TokenPolicy,

    /// Broadcast buffer size of the notification stream.
    pub notification_capacity: usize,

    pub log: LogConfig,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            token_policy: TokenPolicy::default(),
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            log: LogConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SubstrateConfig {
    /// Load configuration from a TOML file, or defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SubstrateConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notification_capacity must be greater than zero".into(),
            ));
        }
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Invalid("log.level must not be empty".into()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SubstrateConfig::default();
        assert_eq!(config.token_policy, TokenPolicy::Unlimited);
        assert_eq!(config.notification_capacity, 1024);
        assert_eq!(config.log.level, "info");
        assert!(!config.log.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_config() {
        let config = SubstrateConfig::load("/nonexistent/path/lineage.toml").unwrap();
        assert_eq!(config, SubstrateConfig::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = SubstrateConfig::from_toml_str(
            r#"
            token_policy = "one_per_holder"

            [log]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.token_policy, TokenPolicy::OnePerHolder);
        assert_eq!(config.notification_capacity, 1024);
        assert_eq!(config.log.level, "info");
        assert!(config.log.json);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = SubstrateConfig::from_toml_str("notification_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = SubstrateConfig::from_toml_str(r#"token_policy = "soulbound""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
