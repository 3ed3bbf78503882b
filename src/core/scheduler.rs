//! Cron-based scheduler driving periodic analysis cycles

use super::runtime::{CycleOutcome, SignalRuntime};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval_seconds is 0")]
    Disabled,
    #[error("interval of {0}s does not divide evenly into a minute, hour or day")]
    UnalignedInterval(u64),
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },
}

/// Convert an interval to a six-field cron expression
/// (second minute hour day month weekday).
///
/// Cron steps restart at every minute, hour or day boundary, so only
/// intervals that divide that boundary evenly tick at a constant rate;
/// anything else returns `None`.
pub fn interval_to_cron(interval_seconds: u64) -> Option<String> {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    match interval_seconds {
        0 => None,
        s if s < MINUTE => (MINUTE % s == 0).then(|| format!("*/{} * * * * *", s)),
        s if s < HOUR => (s % MINUTE == 0 && HOUR % s == 0)
            .then(|| format!("0 */{} * * * *", s / MINUTE)),
        s if s <= DAY => (s % HOUR == 0 && DAY % s == 0)
            .then(|| format!("0 0 */{} * * *", s / HOUR)),
        _ => None,
    }
}

/// Scheduler that runs one analysis cycle per cron tick
pub struct JobScheduler {
    runtime: Arc<SignalRuntime>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JobScheduler {
    /// `interval_seconds` of 0 disables scheduling
    pub fn new(runtime: Arc<SignalRuntime>, interval_seconds: u64) -> Result<Self, SchedulerError> {
        if interval_seconds == 0 {
            return Err(SchedulerError::Disabled);
        }

        let cron_expr = interval_to_cron(interval_seconds)
            .ok_or(SchedulerError::UnalignedInterval(interval_seconds))?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| SchedulerError::InvalidCron {
            expression: cron_expr.clone(),
            reason: e.to_string(),
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "JobScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            runtime,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn start(&self) {
        let runtime = self.runtime.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: started, waiting for cron schedule...");

            loop {
                match schedule.upcoming(chrono::Utc).next() {
                    Some(next_tick) => {
                        let now = chrono::Utc::now();
                        if next_tick > now {
                            let duration = (next_tick - now).to_std().unwrap_or_default();
                            tokio::time::sleep(duration).await;
                        }
                    }
                    None => {
                        tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                        continue;
                    }
                }

                debug!("JobScheduler: cron tick");
                // Cycles run detached; a tick landing mid-cycle is skipped
                let runtime = runtime.clone();
                tokio::spawn(async move {
                    if let CycleOutcome::Skipped = runtime.run_cycle().await {
                        info!("JobScheduler: previous cycle still running, tick skipped");
                    }
                });
            }
        });

        *self.handle.write().await = Some(handle);
        info!("JobScheduler: started successfully");
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
