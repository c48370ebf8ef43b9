//! Velocity limits configuration
//!
//! Defaults are the reference policy: 5000 per day, 3 loads per day and
//! 20000 per ISO week. Any field missing from a config file falls back to
//! its default.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the Velocity Engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityConfig {
    /// Maximum amount loaded per customer per calendar day
    #[serde(default = "default_daily_amount_limit")]
    pub daily_amount_limit: Decimal,

    /// Maximum number of loads per customer per calendar day
    #[serde(default = "default_daily_load_limit")]
    pub daily_load_limit: u32,

    /// Maximum amount loaded per customer per ISO week
    #[serde(default = "default_weekly_amount_limit")]
    pub weekly_amount_limit: Decimal,

    /// What to do with an attempt id the ledger already holds
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// Handling of repeated `(customer_id, id)` attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Evaluate every attempt as new; repeats count toward the limits
    #[default]
    Record,

    /// An attempt already in the ledger is reported accepted and not appended again
    Skip,
}

fn default_daily_amount_limit() -> Decimal {
    Decimal::new(5_000, 0)
}

fn default_daily_load_limit() -> u32 {
    3
}

fn default_weekly_amount_limit() -> Decimal {
    Decimal::new(20_000, 0)
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            daily_amount_limit: default_daily_amount_limit(),
            daily_load_limit: default_daily_load_limit(),
            weekly_amount_limit: default_weekly_amount_limit(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl VelocityConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would decline every attempt
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daily_amount_limit <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "daily_amount_limit must be positive, got {}",
                self.daily_amount_limit
            )));
        }
        if self.daily_load_limit == 0 {
            return Err(ConfigError::Invalid(
                "daily_load_limit must be at least 1".to_string(),
            ));
        }
        if self.weekly_amount_limit <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "weekly_amount_limit must be positive, got {}",
                self.weekly_amount_limit
            )));
        }
        Ok(())
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = VelocityConfig::default();

        assert_eq!(config.daily_amount_limit, dec!(5000));
        assert_eq!(config.daily_load_limit, 3);
        assert_eq!(config.weekly_amount_limit, dec!(20000));
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Record);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{ "weekly_amount_limit": "15000", "duplicate_policy": "skip" }"#;
        let config: VelocityConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.weekly_amount_limit, dec!(15000));
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Skip);
        assert_eq!(config.daily_amount_limit, dec!(5000)); // default
        assert_eq!(config.daily_load_limit, 3); // default
    }

    #[test]
    fn test_config_serialization() {
        let config = VelocityConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();

        assert!(json.contains("\"daily_amount_limit\": \"5000\""));
        assert!(json.contains("\"record\""));

        let parsed: VelocityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = VelocityConfig {
            daily_load_limit: 0,
            ..VelocityConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = VelocityConfig {
            weekly_amount_limit: dec!(-1),
            ..VelocityConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("velocity.json");
        std::fs::write(&path, r#"{ "daily_load_limit": 5 }"#).unwrap();

        let config = VelocityConfig::from_file(&path).unwrap();
        assert_eq!(config.daily_load_limit, 5);

        std::fs::write(&path, r#"{ "daily_amount_limit": "0" }"#).unwrap();
        assert!(matches!(
            VelocityConfig::from_file(&path),
            Err(ConfigError::Invalid(_))
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            VelocityConfig::from_file(&missing),
            Err(ConfigError::Io(_))
        ));
    }
}
