//! Break of Structure (BOS)
//!
//! Bullish context: the current close exceeds the highest high of the
//! `lookback` bars before it. Bearish context: the close falls below their
//! lowest low.

use super::{prior_window, volume_supported};
use crate::common::math;
use crate::models::{Bar, Confirmation, SignalDirection};

pub fn detect_break_of_structure(
    bars: &[Bar],
    direction: SignalDirection,
    lookback: usize,
    volume_threshold: f64,
) -> Confirmation {
    let Some((window, current)) = prior_window(bars, lookback) else {
        return Confirmation::absent();
    };

    let level = match direction {
        SignalDirection::Bullish => {
            let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
            math::max(&highs).filter(|&prior_high| current.close > prior_high)
        }
        SignalDirection::Bearish => {
            let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
            math::min(&lows).filter(|&prior_low| current.close < prior_low)
        }
        SignalDirection::None => None,
    };

    match level {
        Some(level) => Confirmation::detected(
            level,
            volume_supported(window, current, volume_threshold),
        ),
        None => Confirmation::absent(),
    }
}
