//! Pool skew snapshot
//!
//! Converts raw pool fields into exact decimal open-interest figures and
//! simulates the removal of the bot's own position. Every transform returns
//! a new value; the observed snapshot is never mutated.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::errors::{EngineError, Result};
use crate::common::types::{Direction, PoolFields, Position};

/// Normalized skew metrics for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSkewState {
    open_interest_long: Decimal,
    open_interest_short: Decimal,
    skew: Decimal,
    /// Carried through untouched; never used in arithmetic
    cumulative_funding_rate: i128,
}

impl PoolSkewState {
    /// Build a snapshot from decoded pool fields
    ///
    /// Rejects negative magnitudes and open interest outside the exact decimal
    /// range. The funding accumulator is kept as the raw integer.
    pub fn from_fields(fields: &PoolFields) -> Result<Self> {
        if fields.open_interest_long < 0 || fields.open_interest_short < 0 {
            return Err(EngineError::InvalidPoolState(format!(
                "negative open interest (long {}, short {})",
                fields.open_interest_long, fields.open_interest_short
            )));
        }

        let open_interest_long = exact(fields.open_interest_long, "open_interest_long")?;
        let open_interest_short = exact(fields.open_interest_short, "open_interest_short")?;
        Self::from_open_interest(
            open_interest_long,
            open_interest_short,
            fields.cumulative_funding_rate,
        )
    }

    fn from_open_interest(
        open_interest_long: Decimal,
        open_interest_short: Decimal,
        cumulative_funding_rate: i128,
    ) -> Result<Self> {
        let skew = open_interest_long
            .checked_sub(open_interest_short)
            .ok_or_else(|| EngineError::InvalidPoolState("skew out of range".to_string()))?;

        Ok(Self {
            open_interest_long,
            open_interest_short,
            skew,
            cumulative_funding_rate,
        })
    }

    pub fn open_interest_long(&self) -> Decimal {
        self.open_interest_long
    }

    pub fn open_interest_short(&self) -> Decimal {
        self.open_interest_short
    }

    /// `open_interest_long - open_interest_short`; positive means longs dominate
    pub fn skew(&self) -> Decimal {
        self.skew
    }

    pub fn cumulative_funding_rate(&self) -> i128 {
        self.cumulative_funding_rate
    }

    /// Side opposite the skew; zero skew resolves to long
    pub fn minority_side(&self) -> Direction {
        if self.skew > Decimal::ZERO {
            Direction::Short
        } else {
            Direction::Long
        }
    }

    /// The pool as it would look once `position` is closed
    ///
    /// Subtracts the position's notional from its own side only. The result
    /// is hypothetical and may hold a negative side if the observed pool and
    /// position disagree; the skew stays exact either way.
    pub fn without_position(&self, position: &Position) -> Result<Self> {
        let notional = position.notional_size();
        let overflow =
            || EngineError::InvalidPoolState("position notional exceeds pool range".to_string());

        let (long, short) = match position.direction {
            Direction::Long => (
                self.open_interest_long.checked_sub(notional).ok_or_else(overflow)?,
                self.open_interest_short,
            ),
            Direction::Short => (
                self.open_interest_long,
                self.open_interest_short.checked_sub(notional).ok_or_else(overflow)?,
            ),
        };

        Self::from_open_interest(long, short, self.cumulative_funding_rate)
    }
}

fn exact(value: i128, field: &str) -> Result<Decimal> {
    Decimal::try_from_i128_with_scale(value, 0)
        .map_err(|e| EngineError::InvalidPoolState(format!("{} = {}: {}", field, value, e)))
}
