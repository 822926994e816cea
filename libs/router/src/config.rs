//! Protocol parameters, TOML-loadable with environment overrides.
//!
//! Every field has a production-ready default; `validate()` runs after any
//! load path so a bad override fails loudly instead of pricing swaps with a
//! nonsense fee.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("swap fee of {0} bps must be below 10000")]
    FeeOutOfRange(u16),

    #[error("max price age must be greater than zero")]
    ZeroPriceAge,

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {var}: {value}")]
    Env { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Swap fee charged on input, in basis points.
    pub swap_fee_bps: u16,
    /// Oracle samples older than this are rejected as stale (seconds).
    pub max_price_age_secs: u64,
    /// Reward units distributed per second by a fresh staking ledger.
    pub default_reward_rate: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            swap_fee_bps: 30,
            max_price_age_secs: 3_600,
            default_reward_rate: 100,
        }
    }
}

impl ProtocolConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `RESERVOIR_*` environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(fee) = read_env("RESERVOIR_SWAP_FEE_BPS")? {
            self.swap_fee_bps = fee;
        }
        if let Some(age) = read_env("RESERVOIR_MAX_PRICE_AGE_SECS")? {
            self.max_price_age_secs = age;
        }
        if let Some(rate) = read_env("RESERVOIR_REWARD_RATE")? {
            self.default_reward_rate = rate;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.swap_fee_bps >= 10_000 {
            return Err(ConfigError::FeeOutOfRange(self.swap_fee_bps));
        }
        if self.max_price_age_secs == 0 {
            return Err(ConfigError::ZeroPriceAge);
        }
        Ok(())
    }
}

fn read_env<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
