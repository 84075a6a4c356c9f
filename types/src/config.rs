use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BASIS_POINTS, DEFAULT_ACTIVITY_WINDOW_SECS, DEFAULT_CONFIDENTIAL_MULTIPLIER,
    DEFAULT_PAYMENT_DIVISOR, DEFAULT_PLAIN_MULTIPLIER_BPS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be > 0")]
    Zero { field: &'static str },
    #[error("plain_multiplier_bps must be at least {min} (got {value})")]
    MultiplierBelowOne { value: u64, min: u64 },
}

/// Tunables for the state engine. Defaults match the documented game rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// An account is active while `now - last_activity < activity_window_secs`.
    pub activity_window_secs: u64,
    /// Winnings per correct plaintext guess, in basis points of the wager.
    pub plain_multiplier_bps: u64,
    /// Winnings per correct confidential guess, as an integer multiple of the wager.
    pub confidential_multiplier: u32,
    /// Native base units per encrypted unit in `depositPlainConverted`.
    pub payment_divisor: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activity_window_secs: DEFAULT_ACTIVITY_WINDOW_SECS,
            plain_multiplier_bps: DEFAULT_PLAIN_MULTIPLIER_BPS,
            confidential_multiplier: DEFAULT_CONFIDENTIAL_MULTIPLIER,
            payment_divisor: DEFAULT_PAYMENT_DIVISOR,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activity_window_secs == 0 {
            return Err(ConfigError::Zero {
                field: "activity_window_secs",
            });
        }
        if self.payment_divisor == 0 {
            return Err(ConfigError::Zero {
                field: "payment_divisor",
            });
        }
        if self.confidential_multiplier == 0 {
            return Err(ConfigError::Zero {
                field: "confidential_multiplier",
            });
        }
        if self.plain_multiplier_bps < BASIS_POINTS {
            return Err(ConfigError::MultiplierBelowOne {
                value: self.plain_multiplier_bps,
                min: BASIS_POINTS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.plain_multiplier_bps, 15_000);
        assert_eq!(config.confidential_multiplier, 2);
    }

    #[test]
    fn rejects_zero_divisor() {
        let config = EngineConfig {
            payment_divisor: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "payment_divisor"
            })
        );
    }

    #[test]
    fn rejects_losing_multiplier() {
        let config = EngineConfig {
            plain_multiplier_bps: 9_000,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MultiplierBelowOne { value: 9_000, .. })
        ));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"activity_window_secs": 60}"#).unwrap();
        assert_eq!(config.activity_window_secs, 60);
        assert_eq!(config.payment_divisor, DEFAULT_PAYMENT_DIVISOR);
    }
}
