//! emasentry: EMA crossover detection, scoring and rate-limited alerting.
//!
//! The pipeline per instrument is
//! bars → [`indicators::IndicatorEngine`] → [`signals::SignalScorer`] →
//! [`signals::CooldownManager`] → alert history and notifications.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
