//! Random open-interest drift standing in for other traders

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use super::ledger::PaperLedger;

/// Spawn a task that nudges both sides of the pool every `period`
///
/// Each side moves by a uniform amount in `[-max_drift, max_drift]`.
pub fn spawn_drift(ledger: PaperLedger, period: Duration, max_drift: u64) -> JoinHandle<()> {
    let bound = max_drift.min(i64::MAX as u64) as i64;

    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut ticker = interval(period);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let long_delta = rng.gen_range(-bound..=bound);
            let short_delta = rng.gen_range(-bound..=bound);
            debug!(long_delta, short_delta, "Applying paper drift");
            ledger
                .perturb(long_delta as i128, short_delta as i128)
                .await;
        }
    })
}
