//! Static process configuration loaded from the environment
//!
//! Every value has a default; `.env` files are picked up by the binary via
//! `dotenvy` before [`Config::from_env`] runs. Values are validated once at
//! load time and never re-checked per cycle.

use crate::core::scheduler::interval_to_cron;
use chrono::Duration;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Unparsable { key: &'static str, value: String },
    #[error("{0}")]
    OutOfRange(String),
}

/// Runtime environment name (`ENVIRONMENT`, default `sandbox`)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Parameters of the indicator engine
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub bos_lookback: usize,
    pub choch_lookback: usize,
    pub volume_threshold: f64,
}

impl IndicatorParams {
    /// Bars needed before anything but "no signal" can be reported
    pub fn required_bars(&self) -> usize {
        self.slow_period
            .max(self.bos_lookback)
            .max(self.choch_lookback)
            + 1
    }
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_period: 9,
            slow_period: 20,
            bos_lookback: 5,
            choch_lookback: 10,
            volume_threshold: 1.5,
        }
    }
}

/// Strength weighting and confidence tiers
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub separation_weight: f64,
    pub bos_weight: f64,
    pub choch_weight: f64,
    /// Credit for a confirmation detected without volume support
    pub unbacked_credit: f64,
    /// |separation| at which the separation component saturates
    pub separation_saturation: f64,
    /// Ascending strength boundaries; each one reached adds a confidence tier
    pub confidence_steps: [f64; 3],
    pub min_signal_strength: f64,
}

impl ScoringConfig {
    pub const SEPARATION_WEIGHT: f64 = 0.5;
    pub const BOS_WEIGHT: f64 = 0.3;
    pub const CHOCH_WEIGHT: f64 = 0.2;
    pub const UNBACKED_CREDIT: f64 = 0.7;
    pub const SEPARATION_SATURATION: f64 = 0.001;
    pub const CONFIDENCE_STEPS: [f64; 3] = [0.5, 0.7, 0.9];
    pub const MIN_SIGNAL_STRENGTH: f64 = 0.7;

    /// Verify weights sum to 1.0
    pub fn weights_balanced(&self) -> bool {
        (self.separation_weight + self.bos_weight + self.choch_weight - 1.0).abs() < 0.001
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            separation_weight: Self::SEPARATION_WEIGHT,
            bos_weight: Self::BOS_WEIGHT,
            choch_weight: Self::CHOCH_WEIGHT,
            unbacked_credit: Self::UNBACKED_CREDIT,
            separation_saturation: Self::SEPARATION_SATURATION,
            confidence_steps: Self::CONFIDENCE_STEPS,
            min_signal_strength: Self::MIN_SIGNAL_STRENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CooldownConfig {
    pub base: Duration,
    pub confirmed: Duration,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            base: Duration::minutes(30),
            confirmed: Duration::minutes(60),
        }
    }
}

/// Binance REST market data settings
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub interval: String,
    pub candle_limit: usize,
    pub request_timeout_seconds: u64,
    pub max_retries: usize,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            interval: "15m".to_string(),
            candle_limit: 100,
            request_timeout_seconds: 10,
            max_retries: 3,
        }
    }
}

/// Notification channel credentials; empty values disable a channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationConfig {
    pub telegram_api_url: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub webhook_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub instruments: Vec<String>,
    pub indicators: IndicatorParams,
    pub scoring: ScoringConfig,
    pub cooldowns: CooldownConfig,
    pub alert_history_capacity: usize,
    pub analysis_interval_seconds: u64,
    pub port: u16,
    pub market_data: MarketDataConfig,
    pub notifications: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instruments: ["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            indicators: IndicatorParams::default(),
            scoring: ScoringConfig::default(),
            cooldowns: CooldownConfig::default(),
            alert_history_capacity: 1000,
            analysis_interval_seconds: 900,
            port: 8080,
            market_data: MarketDataConfig::default(),
            notifications: NotificationConfig {
                telegram_api_url: "https://api.telegram.org".to_string(),
                ..NotificationConfig::default()
            },
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to defaults, then validate
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let instruments = match env::var("INSTRUMENTS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.instruments,
        };

        let config = Config {
            instruments,
            indicators: IndicatorParams {
                fast_period: env_or("FAST_EMA", defaults.indicators.fast_period)?,
                slow_period: env_or("SLOW_EMA", defaults.indicators.slow_period)?,
                bos_lookback: env_or("BOS_LOOKBACK", defaults.indicators.bos_lookback)?,
                choch_lookback: env_or("CHOCH_LOOKBACK", defaults.indicators.choch_lookback)?,
                volume_threshold: env_or("VOLUME_THRESHOLD", defaults.indicators.volume_threshold)?,
            },
            scoring: ScoringConfig {
                min_signal_strength: env_or(
                    "MIN_SIGNAL_STRENGTH",
                    defaults.scoring.min_signal_strength,
                )?,
                ..defaults.scoring
            },
            cooldowns: CooldownConfig {
                base: env_minutes("BASE_SIGNAL_COOLDOWN_MINUTES", defaults.cooldowns.base)?,
                confirmed: env_minutes(
                    "CONFIRMED_SIGNAL_COOLDOWN_MINUTES",
                    defaults.cooldowns.confirmed,
                )?,
            },
            alert_history_capacity: env_or("MAX_ALERT_HISTORY", defaults.alert_history_capacity)?,
            analysis_interval_seconds: env_or(
                "ANALYSIS_INTERVAL_SECONDS",
                defaults.analysis_interval_seconds,
            )?,
            port: env_or("PORT", defaults.port)?,
            market_data: MarketDataConfig {
                base_url: env_string("BINANCE_API_URL", defaults.market_data.base_url),
                interval: env_string("TIMEFRAME", defaults.market_data.interval),
                candle_limit: env_or("CANDLE_LIMIT", defaults.market_data.candle_limit)?,
                request_timeout_seconds: env_or(
                    "DATA_TIMEOUT_SECONDS",
                    defaults.market_data.request_timeout_seconds,
                )?,
                max_retries: env_or("MAX_RETRIES", defaults.market_data.max_retries)?,
            },
            notifications: NotificationConfig {
                telegram_api_url: env_string(
                    "TELEGRAM_API_URL",
                    defaults.notifications.telegram_api_url,
                ),
                telegram_bot_token: env_string("TELEGRAM_BOT_TOKEN", String::new()),
                telegram_chat_id: env_string("TELEGRAM_CHAT_ID", String::new()),
                webhook_url: env_string("IOS_WEBHOOK_URL", String::new()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Longest accepted cooldown (one year)
    pub fn max_cooldown() -> Duration {
        Duration::days(365)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        if ind.fast_period == 0 || ind.slow_period == 0 {
            return Err(out_of_range("EMA periods must be greater than zero"));
        }
        if ind.fast_period >= ind.slow_period {
            return Err(out_of_range(format!(
                "fast EMA period ({}) must be shorter than slow EMA period ({})",
                ind.fast_period, ind.slow_period
            )));
        }
        if ind.bos_lookback == 0 || ind.choch_lookback == 0 {
            return Err(out_of_range("BOS/CHOCH lookbacks must be greater than zero"));
        }
        if !(ind.volume_threshold.is_finite() && ind.volume_threshold > 0.0) {
            return Err(out_of_range("volume threshold must be a positive number"));
        }

        let scoring = &self.scoring;
        if !(0.0..=1.0).contains(&scoring.min_signal_strength) {
            return Err(out_of_range("minimum signal strength must be within [0, 1]"));
        }
        if !scoring.weights_balanced() {
            return Err(out_of_range("scoring weights must sum to 1.0"));
        }
        if !(0.0..=1.0).contains(&scoring.unbacked_credit) || scoring.separation_saturation <= 0.0 {
            return Err(out_of_range("invalid separation saturation or unbacked credit"));
        }
        if scoring.confidence_steps.windows(2).any(|w| w[0] > w[1]) {
            return Err(out_of_range("confidence steps must be ascending"));
        }

        if self.cooldowns.base <= Duration::zero() || self.cooldowns.confirmed <= Duration::zero() {
            return Err(out_of_range("cooldowns must be greater than zero"));
        }
        if self.cooldowns.confirmed > Self::max_cooldown() {
            return Err(out_of_range(format!(
                "cooldowns must not exceed {} minutes",
                Self::max_cooldown().num_minutes()
            )));
        }
        if self.cooldowns.base > self.cooldowns.confirmed {
            return Err(out_of_range("base cooldown must not exceed confirmed cooldown"));
        }
        if self.alert_history_capacity == 0 {
            return Err(out_of_range("alert history capacity must be greater than zero"));
        }
        if self.instruments.is_empty() {
            return Err(out_of_range("at least one instrument must be configured"));
        }
        // The provider drops the still-forming kline, so one extra is needed
        if self.market_data.candle_limit <= ind.required_bars() {
            return Err(out_of_range(format!(
                "candle limit ({}) must exceed the {} closed bars the indicators need",
                self.market_data.candle_limit,
                ind.required_bars()
            )));
        }
        if interval_to_cron(self.analysis_interval_seconds).is_none() {
            return Err(out_of_range(format!(
                "analysis interval of {}s must evenly divide a minute, hour or day",
                self.analysis_interval_seconds
            )));
        }

        Ok(())
    }
}

fn out_of_range(message: impl Into<String>) -> ConfigError {
    ConfigError::OutOfRange(message.into())
}

fn env_string(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn env_minutes(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let minutes: i64 = env_or(key, default.num_minutes())?;
    Duration::try_minutes(minutes).ok_or_else(|| {
        out_of_range(format!("{} of {} minutes is out of range", key, minutes))
    })
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::Unparsable { key, value: raw })
        }
        _ => Ok(default),
    }
}
