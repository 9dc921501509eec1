//! Trait definitions for the chain-side collaborators
//!
//! The decision engine never talks to a ledger directly. Everything it
//! observes or submits goes through one of these seams, so the state
//! machine can be driven by a live RPC client, the paper ledger, or a
//! test double.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::errors::{ExecutionError, Result};
use super::types::{Address, PoolFields, Position, UnsettledCollateralAccount};
use crate::strategy::TradeIntent;

/// Source of pool account state
#[async_trait]
pub trait PoolStateSource: Send + Sync {
    /// Fetch and decode the current pool account
    async fn fetch_pool(&self, pool: &Address) -> Result<PoolFields>;

    /// Start forwarding decoded pool-state changes to the provided channel
    ///
    /// Delivery is best-effort and ordered; rapid successive updates may be
    /// coalesced or dropped by the source. The stream ends when the source
    /// drops the sender.
    ///
    /// # Arguments
    /// * `pool` - Pool account to watch
    /// * `sender` - Channel sender for forwarding updates
    async fn subscribe(&self, pool: &Address, sender: mpsc::Sender<PoolFields>) -> Result<()>;
}

/// Source of position accounts
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Fetch a position, `None` if the account does not exist on chain
    async fn fetch_position(&self, position: &Address) -> Result<Option<Position>>;

    /// Number of positions ever opened by `owner` in `pool`
    async fn position_count(&self, owner: &Address, pool: &Address) -> Result<u64>;
}

/// Source of the owner's unsettled collateral account
#[async_trait]
pub trait UnsettledCollateralSource: Send + Sync {
    /// Fetch the account, `None` if it has never been created
    async fn fetch_unsettled(&self, owner: &Address)
        -> Result<Option<UnsettledCollateralAccount>>;
}

/// Builds, signs, submits and confirms transactions
///
/// Each call suspends until the ledger confirms or fails the transaction.
/// A rotation is atomic on the ledger: either the old position is fully
/// replaced, or it is untouched.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// Open a first position, returning its address
    async fn submit_open(
        &self,
        intent: &TradeIntent,
    ) -> std::result::Result<Address, ExecutionError>;

    /// Close `current` and open a replacement in one transaction
    async fn submit_rotate(
        &self,
        current: &Address,
        intent: &TradeIntent,
    ) -> std::result::Result<Address, ExecutionError>;
}

/// Deterministic position address computation
pub trait AddressDeriver: Send + Sync {
    fn derive_position(&self, pool: &Address, owner: &Address, sequence: u64) -> Address;
}
