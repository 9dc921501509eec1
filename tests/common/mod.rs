//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify, Semaphore};

use skew_filler::common::traits::{
    PoolStateSource, PositionSource, TransactionExecutor, UnsettledCollateralSource,
};
use skew_filler::config::types::{
    AppConfig, AppSettings, ExecutionConfig, OwnerConfig, PaperConfig, PoolConfig,
    StartupConfig, StrategyConfig,
};
use skew_filler::{
    Address, Collaborators, EngineError, ExecutionError, PoolFields, Position, Result,
    TradeIntent, UnsettledCollateralAccount,
};

pub const POOL: &str = "Pool111";
pub const OWNER: &str = "Owner111";

/// Config with the production sizing constants and a custom dust threshold
pub fn sample_config(minimum_actionable_size: u64) -> AppConfig {
    AppConfig {
        pool: PoolConfig {
            address: Address::new(POOL),
        },
        owner: OwnerConfig {
            address: Address::new(OWNER),
        },
        strategy: StrategyConfig {
            trade_fraction: dec!(0.95),
            leverage: 10,
            minimum_actionable_size,
        },
        startup: StartupConfig::default(),
        execution: ExecutionConfig {
            confirmation_timeout_seconds: 5,
        },
        paper: PaperConfig::default(),
        settings: AppSettings::default(),
    }
}

/// Poll `check` until it holds, failing the test after five seconds
pub async fn wait_for<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// A submission seen by [`GatedChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// `None` for an open, the replaced handle for a rotation
    pub current: Option<Address>,
    pub intent: TradeIntent,
}

/// Fake chain whose executor blocks until the test releases it
///
/// Records how many submissions were in flight at once. Pool updates are
/// only delivered through [`GatedChain::push`].
pub struct GatedChain {
    pool: Mutex<PoolFields>,
    positions: Mutex<HashMap<Address, Position>>,
    subscriber: Mutex<Option<mpsc::Sender<PoolFields>>>,
    subscribed: Notify,
    gate: Semaphore,
    entered: mpsc::UnboundedSender<Submission>,
    submissions: Mutex<Vec<Submission>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    next_id: AtomicU64,
    fail_next_fetch: AtomicBool,
    position_fetches: AtomicUsize,
}

impl GatedChain {
    /// Returns the chain and a stream of submissions as they enter the executor
    pub fn new(fields: PoolFields) -> (Arc<Self>, mpsc::UnboundedReceiver<Submission>) {
        let (entered, receiver) = mpsc::unbounded_channel();
        let chain = Arc::new(Self {
            pool: Mutex::new(fields),
            positions: Mutex::new(HashMap::new()),
            subscriber: Mutex::new(None),
            subscribed: Notify::new(),
            gate: Semaphore::new(0),
            entered,
            submissions: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            next_id: AtomicU64::new(0),
            fail_next_fetch: AtomicBool::new(false),
            position_fetches: AtomicUsize::new(0),
        });
        (chain, receiver)
    }

    pub fn collaborators(chain: &Arc<Self>) -> Collaborators {
        Collaborators {
            pools: chain.clone(),
            positions: chain.clone(),
            unsettled: chain.clone(),
            executor: chain.clone(),
        }
    }

    /// Wait until the loop has subscribed and its initial evaluation has
    /// read both the pool and the tracked position
    pub async fn wait_initial_evaluation(&self) {
        self.subscribed.notified().await;
        while self.position_fetches.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Set the pool state and notify the subscriber
    pub async fn push(&self, fields: PoolFields) {
        *self.pool.lock().unwrap() = fields;
        let sender = self.subscriber.lock().unwrap().clone();
        if let Some(sender) = sender {
            sender.send(fields).await.unwrap();
        }
    }

    /// Let `count` blocked or future submissions complete
    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    /// Drop the subscriber sender, ending the update stream
    pub fn close(&self) {
        self.subscriber.lock().unwrap().take();
    }

    /// Make the next position fetch fail with an RPC error
    pub fn fail_next_position_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    /// True until an injected fetch failure has been consumed
    pub fn fetch_failure_pending(&self) -> bool {
        self.fail_next_fetch.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn submit(
        &self,
        current: Option<Address>,
        intent: &TradeIntent,
    ) -> std::result::Result<Address, ExecutionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let submission = Submission {
            current: current.clone(),
            intent: *intent,
        };
        self.submissions.lock().unwrap().push(submission.clone());
        let _ = self.entered.send(submission);

        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| ExecutionError::Submission(e.to_string()))?;
        permit.forget();

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let address = Address::new(format!("Pos{}", id));
        {
            let mut positions = self.positions.lock().unwrap();
            if let Some(current) = current {
                positions.remove(&current);
            }
            positions.insert(
                address.clone(),
                Position::new(intent.direction, intent.size, intent.leverage),
            );
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(address)
    }
}

#[async_trait]
impl PoolStateSource for GatedChain {
    async fn fetch_pool(&self, _pool: &Address) -> Result<PoolFields> {
        Ok(*self.pool.lock().unwrap())
    }

    async fn subscribe(&self, _pool: &Address, sender: mpsc::Sender<PoolFields>) -> Result<()> {
        *self.subscriber.lock().unwrap() = Some(sender);
        self.subscribed.notify_one();
        Ok(())
    }
}

#[async_trait]
impl PositionSource for GatedChain {
    async fn fetch_position(&self, position: &Address) -> Result<Option<Position>> {
        self.position_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(EngineError::Rpc("position account unavailable".to_string()));
        }
        Ok(self.positions.lock().unwrap().get(position).copied())
    }

    async fn position_count(&self, _owner: &Address, _pool: &Address) -> Result<u64> {
        Ok(self.next_id.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl UnsettledCollateralSource for GatedChain {
    async fn fetch_unsettled(
        &self,
        _owner: &Address,
    ) -> Result<Option<UnsettledCollateralAccount>> {
        Ok(None)
    }
}

#[async_trait]
impl TransactionExecutor for GatedChain {
    async fn submit_open(
        &self,
        intent: &TradeIntent,
    ) -> std::result::Result<Address, ExecutionError> {
        self.submit(None, intent).await
    }

    async fn submit_rotate(
        &self,
        current: &Address,
        intent: &TradeIntent,
    ) -> std::result::Result<Address, ExecutionError> {
        self.submit(Some(current.clone()), intent).await
    }
}
