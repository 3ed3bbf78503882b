//! emasentry server
//!
//! Runs the periodic EMA crossover analysis and the HTTP admin API in one
//! process.

use dotenvy::dotenv;
use emasentry::config::{get_environment, Config};
use emasentry::core::http::{start_server, AppState};
use emasentry::core::runtime::{RuntimeConfig, SignalRuntime};
use emasentry::core::scheduler::JobScheduler;
use emasentry::logging;
use emasentry::metrics::Metrics;
use emasentry::services::binance::BinanceMarketDataProvider;
use emasentry::services::notifications::NotificationDispatcher;
use emasentry::signals::{AlertHistory, CooldownManager, SignalScorer};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    info!("Starting emasentry");
    info!(environment = %get_environment(), "Environment");
    info!(
        instruments = ?config.instruments,
        interval = %config.market_data.interval,
        fast = config.indicators.fast_period,
        slow = config.indicators.slow_period,
        "Watching {} instruments",
        config.instruments.len()
    );

    let metrics = Arc::new(Metrics::new()?);
    let provider = Arc::new(BinanceMarketDataProvider::new(&config.market_data)?);
    let dispatcher = NotificationDispatcher::from_config(
        &config.notifications,
        Duration::from_secs(config.market_data.request_timeout_seconds),
    );
    info!(channels = ?dispatcher.channels(), "Notification channels ready");

    let runtime = Arc::new(
        SignalRuntime::new(
            RuntimeConfig::from(&config),
            provider,
            SignalScorer::new(config.scoring.clone()),
            Arc::new(CooldownManager::new(config.cooldowns.clone())),
            Arc::new(AlertHistory::new(config.alert_history_capacity)),
            metrics.clone(),
        )
        .with_dispatcher(dispatcher),
    );

    let scheduler = JobScheduler::new(runtime.clone(), config.analysis_interval_seconds)?;
    scheduler.start().await;

    let state = AppState::new(runtime.clone(), metrics);
    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(state, port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    // First analysis right away instead of waiting for the first tick
    let initial = runtime.clone();
    tokio::spawn(async move {
        initial.run_cycle().await;
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    scheduler.stop().await;
    info!("emasentry stopped");
    Ok(())
}
