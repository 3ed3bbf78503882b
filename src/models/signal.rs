//! Signal values flowing through detection, scoring and admission

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Bullish,
    Bearish,
    None,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Bullish => "bullish",
            SignalDirection::Bearish => "bearish",
            SignalDirection::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SignalDirection::None)
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bullish" | "long" => Ok(SignalDirection::Bullish),
            "bearish" | "short" => Ok(SignalDirection::Bearish),
            "none" => Ok(SignalDirection::None),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// `Base` is a bare crossover, `Confirmed` has at least one volume-backed confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalClass {
    Base,
    Confirmed,
}

impl SignalClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalClass::Base => "base",
            SignalClass::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for SignalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(SignalClass::Base),
            "confirmed" => Ok(SignalClass::Confirmed),
            other => Err(format!("unknown signal class '{}'", other)),
        }
    }
}

/// Outcome of one structural confirmation check (BOS or CHOCH).
///
/// `volume_backed` is only ever set together with `detected`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Confirmation {
    pub detected: bool,
    pub volume_backed: bool,
    /// Structure level the close broke through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
}

impl Confirmation {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn detected(level: f64, volume_backed: bool) -> Self {
        Self {
            detected: true,
            volume_backed,
            level: Some(level),
        }
    }
}

/// Per-cycle detection result for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    pub instrument: String,
    pub direction: SignalDirection,
    pub fast_ema: f64,
    pub slow_ema: f64,
    /// (fast - slow) / slow
    pub separation: f64,
    pub bos: Confirmation,
    pub choch: Confirmation,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawSignal {
    /// "Nothing to report" value used for insufficient or malformed data
    pub fn none(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            direction: SignalDirection::None,
            fast_ema: 0.0,
            slow_ema: 0.0,
            separation: 0.0,
            bos: Confirmation::absent(),
            choch: Confirmation::absent(),
            price: 0.0,
            timestamp: None,
        }
    }

    pub fn volume_backed_confirmations(&self) -> u8 {
        u8::from(self.bos.volume_backed) + u8::from(self.choch.volume_backed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSignal {
    #[serde(flatten)]
    pub raw: RawSignal,
    pub strength: f64,
    pub confidence: u8,
    pub class: SignalClass,
}

impl ScoredSignal {
    pub fn instrument(&self) -> &str {
        &self.raw.instrument
    }

    pub fn direction(&self) -> SignalDirection {
        self.raw.direction
    }

    pub fn cooldown_key(&self) -> CooldownKey {
        CooldownKey::new(self.raw.instrument.clone(), self.raw.direction, self.class)
    }
}

/// Identity under which cooldowns are tracked
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CooldownKey {
    pub instrument: String,
    pub direction: SignalDirection,
    pub class: SignalClass,
}

impl CooldownKey {
    pub fn new(instrument: impl Into<String>, direction: SignalDirection, class: SignalClass) -> Self {
        Self {
            instrument: instrument.into(),
            direction,
            class,
        }
    }
}

// Ordering for snapshots: instrument, then direction, then class.
impl PartialOrd for SignalDirection {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SignalDirection {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for SignalClass {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SignalClass {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// Emitted alert; the payload handed to notification delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub instrument: String,
    pub direction: SignalDirection,
    pub class: SignalClass,
    pub strength: f64,
    pub confidence: u8,
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub separation: f64,
    pub bos: Confirmation,
    pub choch: Confirmation,
    pub price: f64,
    pub emitted_at: DateTime<Utc>,
}

impl Alert {
    pub fn from_scored(signal: &ScoredSignal, emitted_at: DateTime<Utc>) -> Self {
        Self {
            instrument: signal.raw.instrument.clone(),
            direction: signal.raw.direction,
            class: signal.class,
            strength: signal.strength,
            confidence: signal.confidence,
            fast_ema: signal.raw.fast_ema,
            slow_ema: signal.raw.slow_ema,
            separation: signal.raw.separation,
            bos: signal.raw.bos,
            choch: signal.raw.choch,
            price: signal.raw.price,
            emitted_at,
        }
    }
}
