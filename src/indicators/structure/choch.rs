//! Change of Character (CHOCH)
//!
//! Swing points are found inside the `lookback` bars before the current bar.
//! A swing high is higher than its left neighbour and not lower than its
//! right neighbour; swing lows mirror that. The preceding structure is
//! bearish when the last two swing highs and the last two swing lows both
//! descend, bullish when both ascend. A CHOCH is the current close breaking
//! the latest swing against that structure.

use super::{prior_window, volume_supported};
use crate::models::{Bar, Confirmation, SignalDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureTrend {
    /// Higher highs and higher lows
    Bullish,
    /// Lower highs and lower lows
    Bearish,
    Ranging,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwingPoints {
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

impl SwingPoints {
    pub fn find(window: &[Bar]) -> Self {
        let mut swings = SwingPoints::default();
        for i in 1..window.len().saturating_sub(1) {
            let (left, bar, right) = (&window[i - 1], &window[i], &window[i + 1]);
            if bar.high > left.high && bar.high >= right.high {
                swings.highs.push(bar.high);
            }
            if bar.low < left.low && bar.low <= right.low {
                swings.lows.push(bar.low);
            }
        }
        swings
    }

    pub fn trend(&self) -> StructureTrend {
        match (last_pair(&self.highs), last_pair(&self.lows)) {
            (Some((h1, h2)), Some((l1, l2))) if h2 > h1 && l2 > l1 => StructureTrend::Bullish,
            (Some((h1, h2)), Some((l1, l2))) if h2 < h1 && l2 < l1 => StructureTrend::Bearish,
            _ => StructureTrend::Ranging,
        }
    }
}

fn last_pair(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [.., prev, last] => Some((*prev, *last)),
        _ => None,
    }
}

pub fn detect_change_of_character(
    bars: &[Bar],
    direction: SignalDirection,
    lookback: usize,
    volume_threshold: f64,
) -> Confirmation {
    let Some((window, current)) = prior_window(bars, lookback) else {
        return Confirmation::absent();
    };

    let swings = SwingPoints::find(window);
    let level = match (direction, swings.trend()) {
        (SignalDirection::Bullish, StructureTrend::Bearish) => swings
            .highs
            .last()
            .copied()
            .filter(|&swing_high| current.close > swing_high),
        (SignalDirection::Bearish, StructureTrend::Bullish) => swings
            .lows
            .last()
            .copied()
            .filter(|&swing_low| current.close < swing_low),
        _ => None,
    };

    match level {
        Some(level) => Confirmation::detected(
            level,
            volume_supported(window, current, volume_threshold),
        ),
        None => Confirmation::absent(),
    }
}
