//! skew_filler Library
//!
//! A funding-gap filler for leveraged-trading pools: watches one pool's
//! long/short open interest and keeps a position on the minority side,
//! rotating it whenever the skew moves enough to be worth a transaction.

pub mod common;
pub mod config;
pub mod engine;
pub mod paper;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{EngineError, ExecutionError, Result};
pub use common::traits::{
    AddressDeriver, PoolStateSource, PositionSource, TransactionExecutor,
    UnsettledCollateralSource,
};
pub use common::types::{Address, Direction, PoolFields, Position, UnsettledCollateralAccount};
pub use config::types::AppConfig;
pub use engine::{BotSession, Collaborators, CycleOutcome, LoopSummary, ReactiveLoop};
pub use paper::{PaperAddressDeriver, PaperLedger};

// Strategy types
pub use strategy::{
    Action, CollateralSplit, CollateralSplitter, Decision, LifecycleState, NoGoReason,
    PoolSkewState, PositionLifecycle, Sizing, TradeIntent, TradeKind, TradeSizer,
};
