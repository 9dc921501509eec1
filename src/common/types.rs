//! Chain-facing value types shared by the engine and its collaborators

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque on-chain account handle (pool, owner or position)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a handle string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying handle string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side of a leveraged position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// On-chain boolean encoding: `true` is long
    pub fn is_long(self) -> bool {
        matches!(self, Direction::Long)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

/// Raw skew fields of a pool account, as decoded by the collaborator
///
/// Magnitudes are signed so a defective decoder producing a negative
/// value is caught by validation instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFields {
    /// Aggregate long open interest, in smallest collateral units
    pub open_interest_long: i128,
    /// Aggregate short open interest, in smallest collateral units
    pub open_interest_short: i128,
    /// Funding accumulator, carried through untouched
    pub cumulative_funding_rate: i128,
}

impl PoolFields {
    pub fn new(open_interest_long: i128, open_interest_short: i128) -> Self {
        Self {
            open_interest_long,
            open_interest_short,
            cumulative_funding_rate: 0,
        }
    }

    pub fn with_funding_rate(mut self, cumulative_funding_rate: i128) -> Self {
        self.cumulative_funding_rate = cumulative_funding_rate;
        self
    }
}

/// An open leveraged position, observed read-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    /// Posted collateral, in smallest collateral units
    pub collateral_amount: u64,
    /// Multiplier applied to collateral to obtain exposure
    pub leverage: u32,
}

impl Position {
    pub fn new(direction: Direction, collateral_amount: u64, leverage: u32) -> Self {
        Self {
            direction,
            collateral_amount,
            leverage,
        }
    }

    /// Exposure this position contributes to its side's open interest
    ///
    /// `u64 * u32` is below 2^96, so the product is always exact.
    pub fn notional_size(&self) -> Decimal {
        Decimal::from(self.collateral_amount) * Decimal::from(self.leverage)
    }
}

/// Collateral owed to the owner but not yet settled into a spendable balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnsettledCollateralAccount {
    pub pending_amount: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_notional_size() {
        let position = Position::new(Direction::Long, 100_000, 10);
        assert_eq!(position.notional_size(), dec!(1000000));
    }

    #[test]
    fn test_notional_size_extremes_are_exact() {
        let position = Position::new(Direction::Short, u64::MAX, u32::MAX);
        let expected = Decimal::from_i128_with_scale(u64::MAX as i128 * u32::MAX as i128, 0);
        assert_eq!(position.notional_size(), expected);
    }

    #[test]
    fn test_direction_encoding() {
        assert!(Direction::Long.is_long());
        assert!(!Direction::Short.is_long());
        assert_eq!(Direction::Long.opposite(), Direction::Short);
        assert_eq!(Direction::Short.to_string(), "Short");
    }

    #[test]
    fn test_address_serializes_transparently() {
        let address = Address::new("Pool111");
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"Pool111\"");
        assert_eq!(address.to_string(), "Pool111");
    }
}
