//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{AppConfig, OwnerConfig, PoolConfig, StrategyConfig};
use crate::common::errors::{EngineError, Result};
use crate::common::types::Address;

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with SKEW__, `__` between sections)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("SKEW")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from plain environment variables only
///
/// Reads `POOL_ADDRESS` and `OWNER_ADDRESS` (both required) plus the optional
/// `TRADE_FRACTION`, `LEVERAGE` and `MINIMUM_ACTIONABLE_SIZE`.
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();

    let pool = required_var("POOL_ADDRESS")?;
    let owner = required_var("OWNER_ADDRESS")?;

    let defaults = StrategyConfig::default();
    let strategy = StrategyConfig {
        trade_fraction: parsed_var("TRADE_FRACTION")?.unwrap_or(defaults.trade_fraction),
        leverage: parsed_var("LEVERAGE")?.unwrap_or(defaults.leverage),
        minimum_actionable_size: parsed_var("MINIMUM_ACTIONABLE_SIZE")?
            .unwrap_or(defaults.minimum_actionable_size),
    };

    let config = AppConfig {
        pool: PoolConfig {
            address: Address::new(pool),
        },
        owner: OwnerConfig {
            address: Address::new(owner),
        },
        strategy,
        startup: Default::default(),
        execution: Default::default(),
        paper: Default::default(),
        settings: Default::default(),
    };
    config.validate()?;
    Ok(config)
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| EngineError::Configuration(format!("Cannot find {}", name)))
}

fn parsed_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| EngineError::Configuration(format!("{}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
