//! In-memory ledger implementing every collaborator trait
//!
//! Used by the binary in dry-run mode and by integration tests. One pool,
//! one owner. Opens and rotations are applied atomically under a single
//! lock. Only external open-interest changes ([`PaperLedger::perturb`]) are
//! pushed to subscribers; the bot's own transactions are not echoed, so a
//! dry run is paced by drift rather than by its own rotations.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::common::errors::{EngineError, ExecutionError, Result};
use crate::common::traits::{
    AddressDeriver, PoolStateSource, PositionSource, TransactionExecutor,
    UnsettledCollateralSource,
};
use crate::common::types::{Address, Direction, PoolFields, Position, UnsettledCollateralAccount};
use crate::strategy::TradeIntent;

/// Position addresses from SHA-256 over (pool, owner, sequence)
#[derive(Debug, Clone, Copy, Default)]
pub struct PaperAddressDeriver;

impl AddressDeriver for PaperAddressDeriver {
    fn derive_position(&self, pool: &Address, owner: &Address, sequence: u64) -> Address {
        let mut hasher = Sha256::new();
        hasher.update(b"position");
        hasher.update(pool.as_str().as_bytes());
        hasher.update(owner.as_str().as_bytes());
        hasher.update(sequence.to_le_bytes());
        Address::new(hex::encode(hasher.finalize()))
    }
}

#[derive(Debug)]
struct LedgerState {
    open_interest_long: i128,
    open_interest_short: i128,
    cumulative_funding_rate: i128,
    positions: HashMap<Address, Position>,
    /// `None` until the owner's unsettled account exists
    pending_unsettled: Option<u64>,
    position_count: u64,
    subscribers: Vec<mpsc::Sender<PoolFields>>,
    fail_next: Option<ExecutionError>,
}

impl LedgerState {
    fn fields(&self) -> PoolFields {
        PoolFields {
            open_interest_long: self.open_interest_long,
            open_interest_short: self.open_interest_short,
            cumulative_funding_rate: self.cumulative_funding_rate,
        }
    }

    fn add_open_interest(&mut self, position: &Position, sign: i128) {
        let notional = position.collateral_amount as i128 * position.leverage as i128 * sign;
        match position.direction {
            Direction::Long => {
                self.open_interest_long = (self.open_interest_long + notional).max(0)
            }
            Direction::Short => {
                self.open_interest_short = (self.open_interest_short + notional).max(0)
            }
        }
    }

    fn take_unsettled(&mut self, requested: u64) -> std::result::Result<(), ExecutionError> {
        if requested == 0 {
            return Ok(());
        }
        match self.pending_unsettled {
            Some(pending) if pending >= requested => {
                self.pending_unsettled = Some(pending - requested);
                Ok(())
            }
            pending => Err(ExecutionError::Rejected(format!(
                "unsettled amount {} exceeds pending {}",
                requested,
                pending.unwrap_or(0)
            ))),
        }
    }

    fn check_injected_failure(&mut self) -> std::result::Result<(), ExecutionError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Simulated ledger for one pool and one owner
#[derive(Clone)]
pub struct PaperLedger {
    pool: Address,
    owner: Address,
    deriver: PaperAddressDeriver,
    state: Arc<Mutex<LedgerState>>,
}

impl PaperLedger {
    pub fn new(pool: Address, owner: Address, fields: PoolFields) -> Self {
        Self {
            pool,
            owner,
            deriver: PaperAddressDeriver,
            state: Arc::new(Mutex::new(LedgerState {
                open_interest_long: fields.open_interest_long,
                open_interest_short: fields.open_interest_short,
                cumulative_funding_rate: fields.cumulative_funding_rate,
                positions: HashMap::new(),
                pending_unsettled: None,
                position_count: 0,
                subscribers: Vec::new(),
                fail_next: None,
            })),
        }
    }

    /// Create (or overwrite) the owner's unsettled account holding `pending`
    pub async fn set_pending_unsettled(&self, pending: u64) {
        self.state.lock().await.pending_unsettled = Some(pending);
    }

    pub fn deriver(&self) -> PaperAddressDeriver {
        self.deriver
    }

    pub async fn pool_fields(&self) -> PoolFields {
        self.state.lock().await.fields()
    }

    pub async fn pending_unsettled(&self) -> Option<u64> {
        self.state.lock().await.pending_unsettled
    }

    pub async fn open_positions(&self) -> Vec<(Address, Position)> {
        let state = self.state.lock().await;
        state
            .positions
            .iter()
            .map(|(address, position)| (address.clone(), *position))
            .collect()
    }

    /// Make the next submission fail with `err`
    pub async fn fail_next_submission(&self, err: ExecutionError) {
        self.state.lock().await.fail_next = Some(err);
    }

    /// True until an injected failure has been consumed by a submission
    pub async fn failure_pending(&self) -> bool {
        self.state.lock().await.fail_next.is_some()
    }

    /// Change open interest as other traders would, clamping at zero
    pub async fn perturb(&self, long_delta: i128, short_delta: i128) {
        let mut state = self.state.lock().await;
        state.open_interest_long = (state.open_interest_long + long_delta).max(0);
        state.open_interest_short = (state.open_interest_short + short_delta).max(0);
        debug!(
            open_interest_long = state.open_interest_long,
            open_interest_short = state.open_interest_short,
            "Open interest drifted"
        );
        Self::publish(&mut state);
    }

    /// Drop every subscriber sender, ending their update streams
    pub async fn close_subscriptions(&self) {
        self.state.lock().await.subscribers.clear();
    }

    fn publish(state: &mut LedgerState) {
        let fields = state.fields();
        state.subscribers.retain(|sender| match sender.try_send(fields) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Subscriber backlog full, dropping pool update");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    fn open_in(&self, state: &mut LedgerState, intent: &TradeIntent) -> Address {
        let address = self
            .deriver
            .derive_position(&self.pool, &self.owner, state.position_count);
        let position = Position::new(intent.direction, intent.size, intent.leverage);

        state.position_count += 1;
        state.add_open_interest(&position, 1);
        state.positions.insert(address.clone(), position);
        address
    }
}

#[async_trait]
impl PoolStateSource for PaperLedger {
    async fn fetch_pool(&self, pool: &Address) -> Result<PoolFields> {
        if pool != &self.pool {
            return Err(EngineError::Rpc(format!("pool {} not found", pool)));
        }
        Ok(self.state.lock().await.fields())
    }

    async fn subscribe(&self, pool: &Address, sender: mpsc::Sender<PoolFields>) -> Result<()> {
        if pool != &self.pool {
            return Err(EngineError::Subscription(format!("pool {} not found", pool)));
        }
        self.state.lock().await.subscribers.push(sender);
        Ok(())
    }
}

#[async_trait]
impl PositionSource for PaperLedger {
    async fn fetch_position(&self, position: &Address) -> Result<Option<Position>> {
        Ok(self.state.lock().await.positions.get(position).copied())
    }

    async fn position_count(&self, owner: &Address, pool: &Address) -> Result<u64> {
        if owner != &self.owner || pool != &self.pool {
            return Ok(0);
        }
        Ok(self.state.lock().await.position_count)
    }
}

#[async_trait]
impl UnsettledCollateralSource for PaperLedger {
    async fn fetch_unsettled(
        &self,
        owner: &Address,
    ) -> Result<Option<UnsettledCollateralAccount>> {
        if owner != &self.owner {
            return Ok(None);
        }
        let state = self.state.lock().await;
        Ok(state
            .pending_unsettled
            .map(|pending_amount| UnsettledCollateralAccount { pending_amount }))
    }
}

#[async_trait]
impl TransactionExecutor for PaperLedger {
    #[instrument(skip(self))]
    async fn submit_open(
        &self,
        intent: &TradeIntent,
    ) -> std::result::Result<Address, ExecutionError> {
        let mut state = self.state.lock().await;
        state.check_injected_failure()?;
        state.take_unsettled(intent.unsettled_amount)?;

        let address = self.open_in(&mut state, intent);
        info!(position = %address, "Paper position opened");
        Ok(address)
    }

    #[instrument(skip(self))]
    async fn submit_rotate(
        &self,
        current: &Address,
        intent: &TradeIntent,
    ) -> std::result::Result<Address, ExecutionError> {
        let mut state = self.state.lock().await;
        state.check_injected_failure()?;

        let old = state.positions.get(current).copied().ok_or_else(|| {
            ExecutionError::Rejected(format!("position {} does not exist", current))
        })?;
        state.take_unsettled(intent.unsettled_amount)?;

        state.positions.remove(current);
        state.add_open_interest(&old, -1);
        let address = self.open_in(&mut state, intent);
        info!(from = %current, to = %address, "Paper position rotated");
        Ok(address)
    }
}
