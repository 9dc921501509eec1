use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::common::errors::{EngineError, Result};
use crate::common::types::{Direction, Position};
use crate::config::types::StrategyConfig;
use crate::strategy::skew::PoolSkewState;

/// Sizing result for one evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Large enough to trade
    Actionable {
        direction: Direction,
        max_trade_size: u64,
        /// Skew after simulating removal of the bot's own position
        simulated: PoolSkewState,
    },
    /// At or below the dust threshold; nothing may be submitted
    NotActionable {
        direction: Direction,
        max_trade_size: u64,
        simulated: PoolSkewState,
    },
}

impl Sizing {
    pub fn is_actionable(&self) -> bool {
        matches!(self, Sizing::Actionable { .. })
    }

    pub fn direction(&self) -> Direction {
        match self {
            Sizing::Actionable { direction, .. } | Sizing::NotActionable { direction, .. } => {
                *direction
            }
        }
    }

    pub fn max_trade_size(&self) -> u64 {
        match self {
            Sizing::Actionable { max_trade_size, .. }
            | Sizing::NotActionable { max_trade_size, .. } => *max_trade_size,
        }
    }

    pub fn simulated(&self) -> &PoolSkewState {
        match self {
            Sizing::Actionable { simulated, .. } | Sizing::NotActionable { simulated, .. } => {
                simulated
            }
        }
    }
}

/// Turns a skew snapshot into a direction and maximum trade size
///
/// Pure and synchronous. A trade fraction below one never flips the skew
/// sign; sizes at or below the dust threshold are never actionable.
#[derive(Debug, Clone, Copy)]
pub struct TradeSizer {
    config: StrategyConfig,
}

impl TradeSizer {
    pub fn new(config: StrategyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn leverage(&self) -> u32 {
        self.config.leverage
    }

    pub fn minimum_actionable_size(&self) -> u64 {
        self.config.minimum_actionable_size
    }

    /// Size a trade against `state`, first removing `existing` from the pool
    ///
    /// `existing` must be the bot's own position as observed this cycle.
    /// Its notional is subtracted exactly once.
    pub fn size(&self, state: &PoolSkewState, existing: Option<&Position>) -> Result<Sizing> {
        let simulated = match existing {
            Some(position) => state.without_position(position)?,
            None => *state,
        };

        let direction = simulated.minority_side();
        let max_trade_size = self.max_trade_size(simulated.skew().abs())?;

        if max_trade_size > self.config.minimum_actionable_size {
            Ok(Sizing::Actionable {
                direction,
                max_trade_size,
                simulated,
            })
        } else {
            Ok(Sizing::NotActionable {
                direction,
                max_trade_size,
                simulated,
            })
        }
    }

    /// `floor(magnitude * trade_fraction / leverage)` in collateral units
    ///
    /// Saturates at `u64::MAX`, the largest amount a collateral account holds.
    pub fn max_trade_size(&self, magnitude: Decimal) -> Result<u64> {
        let overflow = || EngineError::InvalidPoolState(format!("skew {} out of range", magnitude));

        let size = magnitude
            .checked_mul(self.config.trade_fraction)
            .and_then(|scaled| scaled.checked_div(Decimal::from(self.config.leverage)))
            .ok_or_else(overflow)?
            .floor();

        Ok(size.to_u64().unwrap_or(if size.is_sign_negative() { 0 } else { u64::MAX }))
    }
}
