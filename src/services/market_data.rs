//! Market data provider interface
//!
//! The analysis pipeline only ever sees `Vec<Bar>`; where the bars come from
//! (exchange REST, replay, tests) is behind [`MarketDataProvider`].

use crate::indicators::IndicatorError;
use crate::models::Bar;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error(transparent)]
    InvalidBar(#[from] IndicatorError),
    #[error("no data for instrument {0}")]
    UnknownInstrument(String),
}

impl MarketDataError {
    /// Worth retrying: transport failures, rate limiting and upstream 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::Request(_) => true,
            MarketDataError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Most recent `limit` closed bars, oldest first
    async fn get_bars(&self, instrument: &str, limit: usize) -> Result<Vec<Bar>, MarketDataError>;
}

/// Provider backed by bars pushed in from elsewhere (replays, tests)
#[derive(Default)]
pub struct StaticMarketDataProvider {
    bars: RwLock<HashMap<String, Vec<Bar>>>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bars(&self, instrument: &str, bars: Vec<Bar>) {
        self.bars.write().insert(instrument.to_string(), bars);
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_bars(&self, instrument: &str, limit: usize) -> Result<Vec<Bar>, MarketDataError> {
        let bars = self.bars.read();
        let series = bars
            .get(instrument)
            .ok_or_else(|| MarketDataError::UnknownInstrument(instrument.to_string()))?;
        let start = series.len().saturating_sub(limit);
        Ok(series[start..].to_vec())
    }
}
