//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{EngineError, Result};
use crate::common::types::Address;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pool to watch
    pub pool: PoolConfig,
    /// Owner of the bot's positions
    pub owner: OwnerConfig,
    /// Sizing parameters
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Initial position handle discovery
    #[serde(default)]
    pub startup: StartupConfig,
    /// Transaction execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Paper ledger settings for dry runs
    #[serde(default)]
    pub paper: PaperConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Check every value the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.pool.address.as_str().is_empty() {
            return Err(EngineError::Configuration("pool address is empty".to_string()));
        }
        if self.owner.address.as_str().is_empty() {
            return Err(EngineError::Configuration("owner address is empty".to_string()));
        }
        self.strategy.validate()?;
        if self.execution.confirmation_timeout_seconds == 0 {
            return Err(EngineError::Configuration(
                "execution.confirmation_timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    pub address: Address,
}

/// Trade sizing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Share of the skew to fill, strictly between 0 and 1
    #[serde(default = "default_trade_fraction")]
    pub trade_fraction: Decimal,
    /// Fixed leverage every position is opened at
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    /// Trades at or below this size (collateral units) are skipped
    #[serde(default = "default_minimum_actionable_size")]
    pub minimum_actionable_size: u64,
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trade_fraction <= Decimal::ZERO || self.trade_fraction >= Decimal::ONE {
            return Err(EngineError::Configuration(format!(
                "strategy.trade_fraction must be in (0, 1), got {}",
                self.trade_fraction
            )));
        }
        if self.leverage == 0 {
            return Err(EngineError::Configuration(
                "strategy.leverage must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            trade_fraction: default_trade_fraction(),
            leverage: default_leverage(),
            minimum_actionable_size: default_minimum_actionable_size(),
        }
    }
}

fn default_trade_fraction() -> Decimal {
    dec!(0.95)
}

fn default_leverage() -> u32 {
    10
}

fn default_minimum_actionable_size() -> u64 {
    // 50 cents at 6 decimals
    500_000
}

/// Which position handle to probe first at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Explicit sequence number; when unset the owner's latest position is probed
    #[serde(default)]
    pub initial_sequence: Option<u64>,
}

impl StartupConfig {
    /// Sequence to derive the initial handle from, given the owner's position counter
    pub fn sequence_for(&self, position_count: u64) -> u64 {
        match self.initial_sequence {
            Some(sequence) => sequence,
            None => position_count.saturating_sub(1),
        }
    }
}

/// Transaction execution settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Seconds to wait for confirmation before treating a transaction as failed
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_seconds: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_seconds: default_confirmation_timeout(),
        }
    }
}

fn default_confirmation_timeout() -> u64 {
    60
}

/// Seed values for the in-memory paper ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Initial long open interest
    #[serde(default = "default_paper_open_interest_long")]
    pub open_interest_long: u64,
    /// Initial short open interest
    #[serde(default)]
    pub open_interest_short: u64,
    /// Unsettled collateral owed to the owner at start
    #[serde(default)]
    pub pending_unsettled: u64,
    /// Milliseconds between simulated open-interest changes (0 disables drift)
    #[serde(default = "default_paper_drift_interval")]
    pub drift_interval_ms: u64,
    /// Largest single simulated open-interest change
    #[serde(default = "default_paper_max_drift")]
    pub max_drift: u64,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            open_interest_long: default_paper_open_interest_long(),
            open_interest_short: 0,
            pending_unsettled: 0,
            drift_interval_ms: default_paper_drift_interval(),
            max_drift: default_paper_max_drift(),
        }
    }
}

fn default_paper_open_interest_long() -> u64 {
    10_000_000
}

fn default_paper_drift_interval() -> u64 {
    5000
}

fn default_paper_max_drift() -> u64 {
    2_000_000
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            pool: PoolConfig {
                address: Address::new("Pool111"),
            },
            owner: OwnerConfig {
                address: Address::new("Owner111"),
            },
            strategy: StrategyConfig::default(),
            startup: StartupConfig::default(),
            execution: ExecutionConfig::default(),
            paper: PaperConfig::default(),
            settings: AppSettings::default(),
        }
    }

    #[test]
    fn test_reference_defaults() {
        let strategy = StrategyConfig::default();
        assert_eq!(strategy.trade_fraction, dec!(0.95));
        assert_eq!(strategy.leverage, 10);
        assert_eq!(strategy.minimum_actionable_size, 500_000);
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_trade_fraction_bounds() {
        for fraction in [dec!(0), dec!(1), dec!(1.5), dec!(-0.1)] {
            let strategy = StrategyConfig {
                trade_fraction: fraction,
                ..StrategyConfig::default()
            };
            assert!(strategy.validate().is_err(), "fraction {} accepted", fraction);
        }
    }

    #[test]
    fn test_zero_leverage_rejected() {
        let mut config = sample_config();
        config.strategy.leverage = 0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_startup_sequence() {
        let latest = StartupConfig::default();
        assert_eq!(latest.sequence_for(0), 0);
        assert_eq!(latest.sequence_for(1), 0);
        assert_eq!(latest.sequence_for(7), 6);

        let fixed = StartupConfig {
            initial_sequence: Some(3),
        };
        assert_eq!(fixed.sequence_for(7), 3);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "pool": {"address": "Pool111"},
            "owner": {"address": "Owner111"},
            "strategy": {"leverage": 5}
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.strategy.leverage, 5);
        assert_eq!(config.strategy.trade_fraction, dec!(0.95));
        assert_eq!(config.execution.confirmation_timeout_seconds, 60);
        assert_eq!(config.startup.initial_sequence, None);
    }
}
