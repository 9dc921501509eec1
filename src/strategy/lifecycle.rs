//! Position lifecycle state machine
//!
//! The only thing remembered across cycles is the handle of the bot's
//! position. Whether that position exists, and what it looks like, is
//! re-observed from the ledger every cycle:
//!
//! ```text
//!   Uninitialized ──Go(Open)──confirmed──▶ Positioned(p)
//!        ▲                                   │   ▲
//!        └──────── account missing ──────────┘   └─ Go(Rotate) confirmed ─▶ Positioned(p')
//! ```
//!
//! An unconfirmed or failed submission never moves the handle.

use tracing::debug;

use crate::common::errors::Result;
use crate::common::types::{Address, Position};
use crate::strategy::sizer::{Sizing, TradeSizer};
use crate::strategy::skew::PoolSkewState;
use crate::strategy::types::{Decision, NoGoReason, TradeKind};

/// Lifecycle state for one evaluation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    /// No position exists at the tracked handle
    Uninitialized,
    /// A position exists at `address`
    Positioned { address: Address, position: Position },
}

impl LifecycleState {
    pub fn position(&self) -> Option<&Position> {
        match self {
            LifecycleState::Uninitialized => None,
            LifecycleState::Positioned { position, .. } => Some(position),
        }
    }
}

/// Tracks the bot's position handle and decides transitions
#[derive(Debug, Clone)]
pub struct PositionLifecycle {
    position_address: Address,
}

impl PositionLifecycle {
    pub fn new(position_address: Address) -> Self {
        Self { position_address }
    }

    /// Handle of the last confirmed position (or the startup probe)
    pub fn position_address(&self) -> &Address {
        &self.position_address
    }

    /// Resolve this cycle's state from what the ledger holds at the tracked handle
    pub fn observe(&self, position: Option<Position>) -> LifecycleState {
        match position {
            Some(position) => LifecycleState::Positioned {
                address: self.position_address.clone(),
                position,
            },
            None => LifecycleState::Uninitialized,
        }
    }

    /// Decide what to do this cycle
    ///
    /// In `Positioned` the bot's own notional is removed from the pool once
    /// before sizing.
    pub fn decide(
        &self,
        state: &LifecycleState,
        skew: &PoolSkewState,
        sizer: &TradeSizer,
    ) -> Result<(Decision, Sizing)> {
        let sizing = sizer.size(skew, state.position())?;

        let decision = match (&sizing, state) {
            (Sizing::NotActionable { max_trade_size, .. }, _) => {
                Decision::NoGo(NoGoReason::BelowMinimum {
                    max_trade_size: *max_trade_size,
                    minimum: sizer.minimum_actionable_size(),
                })
            }
            (
                Sizing::Actionable {
                    direction,
                    max_trade_size,
                    ..
                },
                LifecycleState::Uninitialized,
            ) => Decision::Go {
                kind: TradeKind::Open,
                direction: *direction,
                size: *max_trade_size,
            },
            (
                Sizing::Actionable {
                    direction,
                    max_trade_size,
                    ..
                },
                LifecycleState::Positioned { address, .. },
            ) => Decision::Go {
                kind: TradeKind::Rotate {
                    current: address.clone(),
                },
                direction: *direction,
                size: *max_trade_size,
            },
        };

        Ok((decision, sizing))
    }

    /// Move to the position the ledger confirmed
    pub fn confirm(&mut self, new_address: Address) {
        debug!(from = %self.position_address, to = %new_address, "Position handle updated");
        self.position_address = new_address;
    }
}
