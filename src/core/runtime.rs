//! Analysis cycle: fetch → evaluate → score → cooldown → history → notify,
//! then one summary when anything was emitted

use crate::config::{Config, IndicatorParams};
use crate::indicators::IndicatorEngine;
use crate::metrics::Metrics;
use crate::models::{Alert, SignalDirection};
use crate::services::market_data::MarketDataProvider;
use crate::services::notifications::NotificationDispatcher;
use crate::signals::{AlertHistory, CooldownManager, SignalScorer};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Configuration for the analysis runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub instruments: Vec<String>,
    pub indicators: IndicatorParams,
    pub candle_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RuntimeConfig {
    fn from(config: &Config) -> Self {
        Self {
            instruments: config.instruments.clone(),
            indicators: config.indicators.clone(),
            candle_limit: config.market_data.candle_limit,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub evaluated: usize,
    pub failed: usize,
    pub crossovers: usize,
    pub below_threshold: usize,
    pub suppressed: usize,
    pub emitted: usize,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle held the guard; nothing was evaluated
    Skipped,
}

enum InstrumentOutcome {
    Failed,
    NoCrossover,
    BelowThreshold,
    Suppressed,
    Emitted(Alert),
}

/// Owns the shared signal state and runs non-overlapping analysis cycles
pub struct SignalRuntime {
    config: RuntimeConfig,
    provider: Arc<dyn MarketDataProvider>,
    scorer: SignalScorer,
    cooldowns: Arc<CooldownManager>,
    history: Arc<AlertHistory>,
    dispatcher: NotificationDispatcher,
    metrics: Arc<Metrics>,
    cycle_guard: Mutex<()>,
    cycles_completed: AtomicU64,
    cycles_skipped: AtomicU64,
    last_report: RwLock<Option<CycleReport>>,
}

impl SignalRuntime {
    pub fn new(
        config: RuntimeConfig,
        provider: Arc<dyn MarketDataProvider>,
        scorer: SignalScorer,
        cooldowns: Arc<CooldownManager>,
        history: Arc<AlertHistory>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config,
            provider,
            scorer,
            cooldowns,
            history,
            dispatcher: NotificationDispatcher::new(),
            metrics,
            cycle_guard: Mutex::new(()),
            cycles_completed: AtomicU64::new(0),
            cycles_skipped: AtomicU64::new(0),
            last_report: RwLock::new(None),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: NotificationDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn cooldowns(&self) -> &Arc<CooldownManager> {
        &self.cooldowns
    }

    pub fn history(&self) -> &Arc<AlertHistory> {
        &self.history
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    pub fn cycles_skipped(&self) -> u64 {
        self.cycles_skipped.load(Ordering::Relaxed)
    }

    pub fn last_report(&self) -> Option<CycleReport> {
        self.last_report.read().clone()
    }

    pub fn is_cycle_running(&self) -> bool {
        self.cycle_guard.try_lock().is_err()
    }

    /// Run one cycle over every configured instrument, or skip if one is
    /// already in progress
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            self.cycles_skipped.fetch_add(1, Ordering::Relaxed);
            self.metrics.analysis_cycles_skipped_total.inc();
            warn!("SignalRuntime: cycle already running, skipping");
            return CycleOutcome::Skipped;
        };

        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            instruments = self.config.instruments.len(),
            "SignalRuntime: starting analysis cycle for {} instruments",
            self.config.instruments.len()
        );

        let outcomes = join_all(
            self.config
                .instruments
                .iter()
                .map(|instrument| self.process_instrument(instrument)),
        )
        .await;

        let mut report = CycleReport {
            started_at: Some(started_at),
            ..CycleReport::default()
        };
        for outcome in outcomes {
            match outcome {
                InstrumentOutcome::Failed => report.failed += 1,
                InstrumentOutcome::NoCrossover => report.evaluated += 1,
                InstrumentOutcome::BelowThreshold => {
                    report.evaluated += 1;
                    report.crossovers += 1;
                    report.below_threshold += 1;
                }
                InstrumentOutcome::Suppressed => {
                    report.evaluated += 1;
                    report.crossovers += 1;
                    report.suppressed += 1;
                }
                InstrumentOutcome::Emitted(alert) => {
                    report.evaluated += 1;
                    report.crossovers += 1;
                    report.emitted += 1;
                    report.alerts.push(alert);
                }
            }
        }

        if report.emitted > 0 && !self.dispatcher.is_empty() {
            let delivery = self.dispatcher.send_summary(&report).await;
            if !delivery.failed.is_empty() {
                self.metrics
                    .notification_failures_total
                    .inc_by(delivery.failed.len() as u64);
            }
        }

        let elapsed = timer.elapsed();
        report.duration_ms = elapsed.as_millis() as u64;
        self.metrics.analysis_cycles_total.inc();
        self.metrics
            .analysis_cycle_duration_seconds
            .observe(elapsed.as_secs_f64());
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);

        info!(
            evaluated = report.evaluated,
            failed = report.failed,
            crossovers = report.crossovers,
            below_threshold = report.below_threshold,
            suppressed = report.suppressed,
            emitted = report.emitted,
            duration_ms = report.duration_ms,
            "SignalRuntime: cycle finished, {} alert(s) emitted",
            report.emitted
        );

        *self.last_report.write() = Some(report.clone());
        CycleOutcome::Completed(report)
    }

    async fn process_instrument(&self, instrument: &str) -> InstrumentOutcome {
        let bars = match self
            .provider
            .get_bars(instrument, self.config.candle_limit)
            .await
        {
            Ok(bars) => bars,
            Err(e) => {
                self.metrics.market_data_failures_total.inc();
                warn!(
                    instrument = %instrument,
                    error = %e,
                    "SignalRuntime: market data unavailable for {}",
                    instrument
                );
                return InstrumentOutcome::Failed;
            }
        };

        let raw = IndicatorEngine::evaluate(instrument, &bars, &self.config.indicators);
        if raw.direction == SignalDirection::None {
            debug!(instrument = %instrument, "SignalRuntime: no crossover for {}", instrument);
            return InstrumentOutcome::NoCrossover;
        }
        self.metrics.crossovers_detected_total.inc();

        let Some(scored) = self.scorer.score(&raw) else {
            self.metrics.signals_below_threshold_total.inc();
            info!(
                instrument = %instrument,
                direction = %raw.direction,
                separation = raw.separation,
                "SignalRuntime: {} {} crossover below minimum strength",
                instrument,
                raw.direction
            );
            return InstrumentOutcome::BelowThreshold;
        };

        let now = Utc::now();
        if !self.cooldowns.admit(&scored, now) {
            self.metrics.alerts_suppressed_total.inc();
            return InstrumentOutcome::Suppressed;
        }

        let alert = Alert::from_scored(&scored, now);
        self.history.push(alert.clone());
        self.metrics.alerts_emitted_total.inc();
        info!(
            instrument = %alert.instrument,
            direction = %alert.direction,
            class = %alert.class,
            strength = alert.strength,
            confidence = alert.confidence,
            "SignalRuntime: emitting {} {} {} alert",
            alert.instrument,
            alert.direction,
            alert.class
        );

        let delivery = self.dispatcher.dispatch(&alert).await;
        if !delivery.failed.is_empty() {
            self.metrics
                .notification_failures_total
                .inc_by(delivery.failed.len() as u64);
        }

        InstrumentOutcome::Emitted(alert)
    }
}
