//! Strategy module for trade decision making
//!
//! Everything here is pure and synchronous; I/O lives in the engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PURE DECISION PATH                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PoolFields                                                 │
//! │       │  PoolSkewState::from_fields                         │
//! │       ▼                                                     │
//! │  PoolSkewState ──(minus own position)──▶ simulated skew     │
//! │       │  TradeSizer                                         │
//! │       ▼                                                     │
//! │  Sizing (direction, max size, actionable?)                  │
//! │       │  PositionLifecycle::decide                          │
//! │       ▼                                                     │
//! │  Decision: NoGo | Go(Open / Rotate)                         │
//! │       │  CollateralSplitter (after unsettled fetch)         │
//! │       ▼                                                     │
//! │  Action(TradeIntent) ──▶ TransactionExecutor                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`PoolSkewState`]: exact open-interest snapshot and skew
//! - [`TradeSizer`]: direction and maximum trade size
//! - [`CollateralSplitter`]: fresh vs. unsettled collateral allocation
//! - [`PositionLifecycle`]: Uninitialized / Positioned transitions

mod collateral;
mod lifecycle;
mod sizer;
mod skew;
mod types;

pub use collateral::{CollateralSplit, CollateralSplitter};
pub use lifecycle::{LifecycleState, PositionLifecycle};
pub use sizer::{Sizing, TradeSizer};
pub use skew::PoolSkewState;
pub use types::{Action, Decision, NoGoReason, TradeIntent, TradeKind};
