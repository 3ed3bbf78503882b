//! EMA (Exponential Moving Average) crossover detection

use crate::common::math;
use crate::models::{Bar, SignalDirection};

/// Fast/slow relationship on the most recent bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaCrossover {
    pub direction: SignalDirection,
    pub fast: f64,
    pub slow: f64,
    /// (fast - slow) / slow, zero when slow is zero
    pub separation: f64,
}

fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Detect a fast/slow crossover on the last bar.
///
/// Compares the relationship at the last two bars, so a crossover is a
/// one-bar pulse: bullish when fast moved from `<= slow` to `> slow`, bearish
/// for the mirror case. Needs `slow_period + 1` bars (and `fast_period + 1`).
pub fn detect_crossover(bars: &[Bar], fast_period: usize, slow_period: usize) -> Option<EmaCrossover> {
    let needed = fast_period.max(slow_period) + 1;
    if fast_period == 0 || slow_period == 0 || bars.len() < needed {
        return None;
    }

    let closes = closes(bars);
    let fast = math::ema_series(&closes, fast_period);
    let slow = math::ema_series(&closes, slow_period);

    let (prev_fast, cur_fast) = last_two(&fast)?;
    let (prev_slow, cur_slow) = last_two(&slow)?;

    let direction = if prev_fast <= prev_slow && cur_fast > cur_slow {
        SignalDirection::Bullish
    } else if prev_fast >= prev_slow && cur_fast < cur_slow {
        SignalDirection::Bearish
    } else {
        SignalDirection::None
    };

    let separation = if cur_slow == 0.0 {
        0.0
    } else {
        (cur_fast - cur_slow) / cur_slow
    };

    Some(EmaCrossover {
        direction,
        fast: cur_fast,
        slow: cur_slow,
        separation,
    })
}

fn last_two(series: &[f64]) -> Option<(f64, f64)> {
    match series {
        [.., prev, cur] => Some((*prev, *cur)),
        _ => None,
    }
}
