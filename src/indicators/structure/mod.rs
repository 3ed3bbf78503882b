//! Market structure confirmations: Break of Structure and Change of Character

pub mod bos;
pub mod choch;

pub use bos::*;
pub use choch::*;

use crate::common::math;
use crate::models::Bar;

/// The `lookback` bars immediately preceding the last bar, plus the last bar
pub(crate) fn prior_window(bars: &[Bar], lookback: usize) -> Option<(&[Bar], &Bar)> {
    if lookback == 0 || bars.len() < lookback + 1 {
        return None;
    }
    let (current, history) = bars.split_last()?;
    Some((&history[history.len() - lookback..], current))
}

/// Current volume is at least `threshold` times the window average.
///
/// A window with zero average volume never supports a signal.
pub fn volume_supported(window: &[Bar], current: &Bar, threshold: f64) -> bool {
    let volumes: Vec<f64> = window.iter().map(|b| b.volume).collect();
    match math::mean(&volumes) {
        Some(avg) if avg > 0.0 => current.volume >= threshold * avg,
        _ => false,
    }
}
