//! Reactive loop: initial evaluation, then one evaluation per pool update

use chrono::{DateTime, Utc};
use std::future::{self, Future};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::session::{BotSession, CycleOutcome};
use crate::common::channels::create_pool_update_channel;
use crate::common::errors::{EngineError, Result};
use crate::common::types::PoolFields;

/// Counters reported when the loop stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSummary {
    pub started_at: DateTime<Utc>,
    /// Update-triggered cycles evaluated (the initial evaluation excluded)
    pub cycles: u64,
    /// Update-triggered cycles that ended in an error
    pub failed_cycles: u64,
    /// Cycles that submitted a confirmed transaction, initial one included
    pub trades: u64,
    /// Notifications superseded by a newer one before they were evaluated
    pub coalesced: u64,
    /// Start of the most recent evaluation, initial one included
    pub last_cycle_at: Option<DateTime<Utc>>,
}

/// Drives a [`BotSession`] from pool notifications
///
/// Evaluations run inline on the loop task, so at most one decision or
/// transaction is in flight. Notifications arriving meanwhile queue up in
/// the channel and are collapsed to the most recent one.
pub struct ReactiveLoop {
    session: BotSession,
}

impl ReactiveLoop {
    pub fn new(session: BotSession) -> Self {
        Self { session }
    }

    /// Run until ctrl-c or until the pool source ends its stream
    pub async fn run(self) -> Result<LoopSummary> {
        self.run_until(shutdown_signal(tokio::signal::ctrl_c())).await
    }

    /// Run until `shutdown` resolves or the pool source ends its stream
    ///
    /// A failure in the initial evaluation is returned to the caller. Failures
    /// in update-triggered cycles are logged and the loop keeps waiting.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<LoopSummary>
    where
        F: Future<Output = ()>,
    {
        let mut summary = LoopSummary {
            started_at: Utc::now(),
            cycles: 0,
            failed_cycles: 0,
            trades: 0,
            coalesced: 0,
            last_cycle_at: None,
        };

        let (sender, mut updates) = create_pool_update_channel();
        let pools = self.session.collaborators().pools.clone();
        pools
            .subscribe(self.session.pool(), sender)
            .await
            .map_err(subscription_error)?;
        info!(pool = %self.session.pool(), "Subscribed to pool updates");

        info!("Running initial evaluation");
        let outcome = self.session.evaluate_current().await?;
        record(&mut summary, &outcome);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                received = updates.recv() => {
                    let Some(fields) = received else {
                        warn!("Pool update stream ended");
                        break;
                    };
                    let fields = latest(fields, &mut updates, &mut summary);

                    summary.cycles += 1;
                    match self.session.run_cycle(fields).await {
                        Ok(outcome) => record(&mut summary, &outcome),
                        Err(e) => {
                            summary.failed_cycles += 1;
                            error!(error = %e, "Evaluation cycle failed");
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Stopping reactive loop");
                    break;
                }
            }
        }

        summary.last_cycle_at = self.session.last_cycle_at();
        info!(
            cycles = summary.cycles,
            failed = summary.failed_cycles,
            trades = summary.trades,
            coalesced = summary.coalesced,
            "Reactive loop stopped"
        );
        Ok(summary)
    }
}

fn subscription_error(err: EngineError) -> EngineError {
    match err {
        EngineError::Subscription(_) => err,
        other => EngineError::Subscription(other.to_string()),
    }
}

/// Resolve when `signal` fires; never resolve if it cannot be listened for
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            error!(error = %e, "Unable to listen for shutdown signal");
            future::pending::<()>().await;
        }
    }
}

/// Keep only the freshest queued pool state
fn latest(
    mut fields: PoolFields,
    updates: &mut mpsc::Receiver<PoolFields>,
    summary: &mut LoopSummary,
) -> PoolFields {
    let mut skipped = 0u64;
    while let Ok(next) = updates.try_recv() {
        fields = next;
        skipped += 1;
    }
    if skipped > 0 {
        debug!(skipped, "Coalesced pool updates");
        summary.coalesced += skipped;
    }
    fields
}

fn record(summary: &mut LoopSummary, outcome: &CycleOutcome) {
    if outcome.submitted() {
        summary.trades += 1;
    }
}
