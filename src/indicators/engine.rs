//! Indicator engine: bar sequence in, [`RawSignal`] out.

use crate::config::IndicatorParams;
use crate::indicators::structure::{detect_break_of_structure, detect_change_of_character};
use crate::indicators::trend::detect_crossover;
use crate::indicators::validation::validate_bars;
use crate::models::{Bar, Confirmation, RawSignal};
use tracing::debug;

pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Evaluate one instrument's bars.
    ///
    /// Short or malformed input yields a `none` signal rather than an error:
    /// missing history is the normal state right after startup.
    pub fn evaluate(instrument: &str, bars: &[Bar], params: &IndicatorParams) -> RawSignal {
        let required = params.required_bars();
        if bars.len() < required {
            debug!(
                instrument = %instrument,
                bars = bars.len(),
                required = required,
                "IndicatorEngine: insufficient history for {} ({} < {})",
                instrument,
                bars.len(),
                required
            );
            return RawSignal::none(instrument);
        }

        if let Err(e) = validate_bars(bars) {
            debug!(
                instrument = %instrument,
                error = %e,
                "IndicatorEngine: rejecting bar sequence for {}: {}",
                instrument,
                e
            );
            return RawSignal::none(instrument);
        }

        let (Some(cross), Some(last)) = (
            detect_crossover(bars, params.fast_period, params.slow_period),
            bars.last(),
        ) else {
            return RawSignal::none(instrument);
        };

        let (bos, choch) = if cross.direction.is_none() {
            (Confirmation::absent(), Confirmation::absent())
        } else {
            (
                detect_break_of_structure(
                    bars,
                    cross.direction,
                    params.bos_lookback,
                    params.volume_threshold,
                ),
                detect_change_of_character(
                    bars,
                    cross.direction,
                    params.choch_lookback,
                    params.volume_threshold,
                ),
            )
        };

        RawSignal {
            instrument: instrument.to_string(),
            direction: cross.direction,
            fast_ema: cross.fast,
            slow_ema: cross.slow,
            separation: cross.separation,
            bos,
            choch,
            price: last.close,
            timestamp: Some(last.timestamp),
        }
    }
}
