//! Binance spot kline provider (`GET /api/v3/klines`)

use crate::config::MarketDataConfig;
use crate::indicators::parse_bar;
use crate::models::Bar;
use crate::services::market_data::{MarketDataError, MarketDataProvider};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub struct BinanceMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
    interval: String,
    max_retries: usize,
    min_retry_delay: Duration,
}

impl BinanceMarketDataProvider {
    pub fn new(config: &MarketDataConfig) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| MarketDataError::Request(e.to_string()))?;
        Ok(Self::with_client(
            config.base_url.clone(),
            client,
            config.interval.clone(),
            config.max_retries,
        ))
    }

    /// Construct around an existing client, e.g. one pointed at a mock server
    pub fn with_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        interval: impl Into<String>,
        max_retries: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interval: interval.into(),
            max_retries,
            min_retry_delay: Duration::from_millis(200),
        }
    }

    pub fn with_min_retry_delay(mut self, delay: Duration) -> Self {
        self.min_retry_delay = delay;
        self
    }

    async fn fetch_klines(&self, symbol: &str, limit: usize) -> Result<Vec<Bar>, MarketDataError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", self.interval.clone()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;

        parse_klines(&rows, Utc::now())
    }
}

/// Convert kline rows to bars, dropping a trailing kline that has not closed
/// by `now`
pub fn parse_klines(rows: &[Vec<Value>], now: DateTime<Utc>) -> Result<Vec<Bar>, MarketDataError> {
    let mut bars = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        if row.len() < 7 {
            return Err(MarketDataError::Decode(format!(
                "kline {} has {} fields, expected at least 7",
                index,
                row.len()
            )));
        }

        let open_time = millis(&row[0], index)?;
        let close_time = millis(&row[6], index)?;
        if close_time > now {
            debug!(index = index, "skipping kline that is still forming");
            continue;
        }

        let fields = [
            string_field(&row[1], index)?,
            string_field(&row[2], index)?,
            string_field(&row[3], index)?,
            string_field(&row[4], index)?,
            string_field(&row[5], index)?,
        ];
        bars.push(parse_bar(fields, open_time, index)?);
    }

    Ok(bars)
}

fn string_field(value: &Value, index: usize) -> Result<&str, MarketDataError> {
    value
        .as_str()
        .ok_or_else(|| MarketDataError::Decode(format!("kline {} has a non-string price field", index)))
}

fn millis(value: &Value, index: usize) -> Result<DateTime<Utc>, MarketDataError> {
    value
        .as_i64()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| MarketDataError::Decode(format!("kline {} has an invalid timestamp", index)))
}

#[async_trait]
impl MarketDataProvider for BinanceMarketDataProvider {
    async fn get_bars(&self, instrument: &str, limit: usize) -> Result<Vec<Bar>, MarketDataError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_retry_delay)
            .with_max_times(self.max_retries);

        let bars = (|| self.fetch_klines(instrument, limit))
            .retry(backoff)
            .when(MarketDataError::is_transient)
            .notify(|e: &MarketDataError, delay: Duration| {
                warn!(
                    instrument = %instrument,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Binance: kline request for {} failed, retrying",
                    instrument
                );
            })
            .await?;

        debug!(
            instrument = %instrument,
            count = bars.len(),
            "Binance: fetched {} bars for {}",
            bars.len(),
            instrument
        );
        Ok(bars)
    }
}
