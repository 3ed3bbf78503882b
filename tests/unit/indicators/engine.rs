//! Unit tests for the indicator engine

use crate::fixtures::{flat_bars, jump_bars};
use emasentry::config::IndicatorParams;
use emasentry::indicators::IndicatorEngine;
use emasentry::models::SignalDirection;

#[test]
fn test_required_bars_covers_every_lookback() {
    let params = IndicatorParams::default();
    assert_eq!(params.required_bars(), 21);

    let params = IndicatorParams {
        choch_lookback: 30,
        ..IndicatorParams::default()
    };
    assert_eq!(params.required_bars(), 31);
}

#[test]
fn test_insufficient_history_yields_none() {
    let bars = jump_bars(20, 100.0, 110.0, 3000.0);
    let raw = IndicatorEngine::evaluate("BTCUSDT", &bars, &IndicatorParams::default());
    assert_eq!(raw.direction, SignalDirection::None);
    assert_eq!(raw.instrument, "BTCUSDT");
    assert!(raw.timestamp.is_none());
}

#[test]
fn test_malformed_bar_yields_none() {
    let mut bars = jump_bars(30, 100.0, 110.0, 3000.0);
    bars[10].volume = f64::NAN;
    let raw = IndicatorEngine::evaluate("BTCUSDT", &bars, &IndicatorParams::default());
    assert_eq!(raw.direction, SignalDirection::None);
}

#[test]
fn test_bullish_jump_with_volume_confirms_bos() {
    let bars = jump_bars(30, 100.0, 110.0, 3000.0);
    let raw = IndicatorEngine::evaluate("BTCUSDT", &bars, &IndicatorParams::default());

    assert_eq!(raw.direction, SignalDirection::Bullish);
    assert_eq!(raw.price, 110.0);
    assert_eq!(raw.timestamp, Some(bars[29].timestamp));
    assert!(raw.separation > 0.001);
    assert!(raw.bos.detected && raw.bos.volume_backed);
    // Flat history has no swing points to break
    assert!(!raw.choch.detected);
    assert_eq!(raw.volume_backed_confirmations(), 1);
}

#[test]
fn test_bearish_drop_without_volume() {
    let bars = jump_bars(30, 100.0, 90.0, 1000.0);
    let raw = IndicatorEngine::evaluate("ETHUSDT", &bars, &IndicatorParams::default());

    assert_eq!(raw.direction, SignalDirection::Bearish);
    assert!(raw.separation < 0.0);
    assert!(raw.bos.detected);
    assert!(!raw.bos.volume_backed);
    assert_eq!(raw.volume_backed_confirmations(), 0);
}

#[test]
fn test_no_crossover_skips_confirmations() {
    let bars = flat_bars(40, 100.0);
    let raw = IndicatorEngine::evaluate("SOLUSDT", &bars, &IndicatorParams::default());

    assert_eq!(raw.direction, SignalDirection::None);
    assert!(!raw.bos.detected);
    assert!(!raw.choch.detected);
    assert_eq!(raw.price, 100.0);
}
