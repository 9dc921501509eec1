use serde::Serialize;

use crate::common::types::{Address, Direction};
use crate::strategy::collateral::CollateralSplit;

/// A fully sized and funded trade, ready for execution
///
/// Only built from an actionable sizing, so `size` is always above the
/// dust threshold and `amount + unsettled_amount == size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeIntent {
    pub direction: Direction,
    /// Collateral committed to the new position
    pub size: u64,
    /// Fresh collateral part of `size`
    pub amount: u64,
    /// Unsettled collateral part of `size`
    pub unsettled_amount: u64,
    pub leverage: u32,
}

impl TradeIntent {
    pub fn new(direction: Direction, split: CollateralSplit, leverage: u32) -> Self {
        Self {
            direction,
            size: split.total(),
            amount: split.amount,
            unsettled_amount: split.unsettled_amount,
            leverage,
        }
    }
}

/// Why a cycle decided not to trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoGoReason {
    /// Maximum trade size is at or below the dust threshold
    BelowMinimum { max_trade_size: u64, minimum: u64 },
}

impl std::fmt::Display for NoGoReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoGoReason::BelowMinimum {
                max_trade_size,
                minimum,
            } => write!(f, "max trade size {} <= minimum {}", max_trade_size, minimum),
        }
    }
}

/// What kind of transaction a Go decision needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TradeKind {
    /// No position exists; open the first one
    Open,
    /// Close the position at `current` and open a replacement atomically
    Rotate { current: Address },
}

/// Lifecycle decision output, before collateral is allocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Decision {
    /// No action should be taken
    NoGo(NoGoReason),
    /// Trade `size` on `direction`
    Go {
        kind: TradeKind,
        direction: Direction,
        size: u64,
    },
}

impl Decision {
    /// Returns true if this is a Go decision
    pub fn is_go(&self) -> bool {
        matches!(self, Self::Go { .. })
    }
}

/// A funded transaction to hand to the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    Open(TradeIntent),
    Rotate { current: Address, intent: TradeIntent },
}

impl Action {
    /// Attach a collateral split to a trade kind
    pub fn funded(kind: TradeKind, intent: TradeIntent) -> Self {
        match kind {
            TradeKind::Open => Action::Open(intent),
            TradeKind::Rotate { current } => Action::Rotate { current, intent },
        }
    }

    pub fn intent(&self) -> &TradeIntent {
        match self {
            Action::Open(intent) | Action::Rotate { intent, .. } => intent,
        }
    }
}
