//! skew_filler - Main Entry Point
//!
//! Runs the funding-gap filler against the in-memory paper ledger. A live
//! deployment supplies its own chain client through the collaborator traits.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use skew_filler::common::types::PoolFields;
use skew_filler::config::load_config;
use skew_filler::engine::{BotSession, Collaborators, ReactiveLoop};
use skew_filler::paper::{spawn_drift, PaperLedger};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Pool address; overrides the config file
    #[arg(long, env = "POOL_ADDRESS")]
    pool: Option<String>,

    /// Owner address; overrides the config file
    #[arg(long, env = "OWNER_ADDRESS")]
    owner: Option<String>,

    /// Milliseconds between simulated open-interest changes (0 disables)
    #[arg(long)]
    paper_drift_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Some(pool) = &args.pool {
        std::env::set_var("SKEW__POOL__ADDRESS", pool);
    }
    if let Some(owner) = &args.owner {
        std::env::set_var("SKEW__OWNER__ADDRESS", owner);
    }
    let mut config = load_config(Some(&args.config))?;
    if let Some(drift) = args.paper_drift_ms {
        config.paper.drift_interval_ms = drift;
    }

    let log_level = args.log_level.as_deref().unwrap_or(&config.settings.log_level);
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting bot...");
    info!("Configuration file: {}", args.config);
    info!(
        pool = %config.pool.address,
        owner = %config.owner.address,
        trade_fraction = %config.strategy.trade_fraction,
        leverage = config.strategy.leverage,
        minimum_actionable_size = config.strategy.minimum_actionable_size,
        "Loaded configuration"
    );

    let ledger = PaperLedger::new(
        config.pool.address.clone(),
        config.owner.address.clone(),
        PoolFields::new(
            config.paper.open_interest_long as i128,
            config.paper.open_interest_short as i128,
        ),
    );
    if config.paper.pending_unsettled > 0 {
        ledger
            .set_pending_unsettled(config.paper.pending_unsettled)
            .await;
    }

    let collaborators = Collaborators {
        pools: Arc::new(ledger.clone()),
        positions: Arc::new(ledger.clone()),
        unsettled: Arc::new(ledger.clone()),
        executor: Arc::new(ledger.clone()),
    };
    let session = BotSession::discover(&config, &ledger.deriver(), collaborators).await?;

    let drift = (config.paper.drift_interval_ms > 0).then(|| {
        spawn_drift(
            ledger.clone(),
            Duration::from_millis(config.paper.drift_interval_ms),
            config.paper.max_drift,
        )
    });

    info!("Running bot...");
    let result = ReactiveLoop::new(session).run().await;

    if let Some(handle) = drift {
        handle.abort();
    }

    match result {
        Ok(summary) => {
            let positions = ledger.open_positions().await;
            let final_pool = ledger.pool_fields().await;
            info!(
                cycles = summary.cycles,
                trades = summary.trades,
                last_cycle_at = ?summary.last_cycle_at,
                ?positions,
                ?final_pool,
                "Bot stopped"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Bot failed");
            Err(e.into())
        }
    }
}
