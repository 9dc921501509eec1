//! Bot session: one owned bundle of state driven once per cycle

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tracing::{debug, info, instrument, warn};

use crate::common::errors::{EngineError, ExecutionError, Result};
use crate::common::traits::{
    AddressDeriver, PoolStateSource, PositionSource, TransactionExecutor,
    UnsettledCollateralSource,
};
use crate::common::types::{Address, PoolFields};
use crate::config::types::AppConfig;
use crate::strategy::{
    Action, CollateralSplitter, Decision, NoGoReason, PoolSkewState, PositionLifecycle,
    TradeIntent, TradeSizer,
};

/// The chain-side services a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub pools: Arc<dyn PoolStateSource>,
    pub positions: Arc<dyn PositionSource>,
    pub unsettled: Arc<dyn UnsettledCollateralSource>,
    pub executor: Arc<dyn TransactionExecutor>,
}

/// Result of a single evaluation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing submitted
    Idle { reason: NoGoReason },
    /// First position confirmed at `address`
    Opened { address: Address, intent: TradeIntent },
    /// Position at `from` replaced by the one at `to`
    Rotated {
        from: Address,
        to: Address,
        intent: TradeIntent,
    },
}

impl CycleOutcome {
    pub fn submitted(&self) -> bool {
        !matches!(self, CycleOutcome::Idle { .. })
    }
}

/// Everything one bot instance owns: its pool, owner, tracked position
/// handle and sizing parameters
pub struct BotSession {
    pool: Address,
    owner: Address,
    lifecycle: PositionLifecycle,
    sizer: TradeSizer,
    confirmation_timeout: Duration,
    collaborators: Collaborators,
    last_cycle_at: Option<DateTime<Utc>>,
}

impl BotSession {
    pub fn new(
        config: &AppConfig,
        initial_position: Address,
        collaborators: Collaborators,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pool: config.pool.address.clone(),
            owner: config.owner.address.clone(),
            lifecycle: PositionLifecycle::new(initial_position),
            sizer: TradeSizer::new(config.strategy)?,
            confirmation_timeout: Duration::from_secs(
                config.execution.confirmation_timeout_seconds,
            ),
            collaborators,
            last_cycle_at: None,
        })
    }

    /// Build a session whose first probed handle is derived from the owner's
    /// position counter (or the configured sequence)
    #[instrument(skip_all, fields(pool = %config.pool.address, owner = %config.owner.address))]
    pub async fn discover(
        config: &AppConfig,
        deriver: &dyn AddressDeriver,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let count = collaborators
            .positions
            .position_count(&config.owner.address, &config.pool.address)
            .await?;
        let sequence = config.startup.sequence_for(count);
        let initial =
            deriver.derive_position(&config.pool.address, &config.owner.address, sequence);

        info!(
            position_count = count,
            sequence,
            position = %initial,
            "Discovered initial position handle"
        );
        Self::new(config, initial, collaborators)
    }

    pub fn pool(&self) -> &Address {
        &self.pool
    }

    /// Handle of the last confirmed position
    pub fn position_address(&self) -> &Address {
        self.lifecycle.position_address()
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// When the most recent cycle started, successful or not
    pub fn last_cycle_at(&self) -> Option<DateTime<Utc>> {
        self.last_cycle_at
    }

    /// Fetch the pool fresh and evaluate it
    pub async fn evaluate_current(&mut self) -> Result<CycleOutcome> {
        let fields = self.collaborators.pools.fetch_pool(&self.pool).await?;
        self.run_cycle(fields).await
    }

    /// Evaluate one observed pool state and act on it
    ///
    /// On any error the tracked handle is left at its last confirmed value.
    #[instrument(skip(self), fields(position = %self.lifecycle.position_address()))]
    pub async fn run_cycle(&mut self, fields: PoolFields) -> Result<CycleOutcome> {
        self.last_cycle_at = Some(Utc::now());
        let skew = PoolSkewState::from_fields(&fields)?;

        let observed = self
            .collaborators
            .positions
            .fetch_position(self.lifecycle.position_address())
            .await?;
        let state = self.lifecycle.observe(observed);

        let (decision, sizing) = self.lifecycle.decide(&state, &skew, &self.sizer)?;
        let (kind, direction, size) = match decision {
            Decision::NoGo(reason) => {
                debug!(
                    skew = %sizing.simulated().skew(),
                    max_trade_size = sizing.max_trade_size(),
                    %reason,
                    "No trade"
                );
                return Ok(CycleOutcome::Idle { reason });
            }
            Decision::Go {
                kind,
                direction,
                size,
            } => (kind, direction, size),
        };

        let account = self
            .collaborators
            .unsettled
            .fetch_unsettled(&self.owner)
            .await
            .map_err(|e| EngineError::CollateralQueryFailed(e.to_string()))?;
        let split = CollateralSplitter::split(size, account.as_ref());
        let intent = TradeIntent::new(direction, split, self.sizer.leverage());
        let action = Action::funded(kind, intent);

        info!(
            current_skew = %sizing.simulated().skew(),
            max_trade_size = size,
            leverage = self.sizer.leverage(),
            amount = split.amount,
            unsettled_amount = split.unsettled_amount,
            %direction,
            "Funding gap found"
        );

        self.execute(action).await
    }

    async fn execute(&mut self, action: Action) -> Result<CycleOutcome> {
        let seconds = self.confirmation_timeout.as_secs();
        let executor = self.collaborators.executor.clone();

        match action {
            Action::Open(intent) => {
                let submitted =
                    tokio::time::timeout(self.confirmation_timeout, executor.submit_open(&intent))
                        .await;
                let address = confirmed(submitted, seconds)?;
                info!(position = %address, "Open position confirmed");
                self.lifecycle.confirm(address.clone());
                Ok(CycleOutcome::Opened { address, intent })
            }
            Action::Rotate { current, intent } => {
                let submitted = tokio::time::timeout(
                    self.confirmation_timeout,
                    executor.submit_rotate(&current, &intent),
                )
                .await;
                let address = confirmed(submitted, seconds)?;
                info!(from = %current, to = %address, "Execute trade confirmed");
                self.lifecycle.confirm(address.clone());
                Ok(CycleOutcome::Rotated {
                    from: current,
                    to: address,
                    intent,
                })
            }
        }
    }
}

type Submitted = std::result::Result<std::result::Result<Address, ExecutionError>, Elapsed>;

fn confirmed(
    submitted: Submitted,
    seconds: u64,
) -> Result<Address> {
    match submitted {
        Ok(Ok(address)) => Ok(address),
        Ok(Err(e)) => {
            warn!(error = %e, "Transaction failed");
            Err(e.into())
        }
        Err(_) => {
            warn!(seconds, "Transaction confirmation timed out");
            Err(ExecutionError::ConfirmationTimeout { seconds }.into())
        }
    }
}
