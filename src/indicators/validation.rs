//! Input checks applied before any indicator runs

use crate::indicators::error::IndicatorError;
use crate::models::Bar;

/// Ensure every bar is well formed and timestamps strictly increase
pub fn validate_bars(bars: &[Bar]) -> Result<(), IndicatorError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_well_formed() {
            return Err(IndicatorError::MalformedBar { index });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(IndicatorError::NonMonotonicTimestamp { index });
        }
    }
    Ok(())
}

pub fn validate_bar(bar: &Bar, index: usize) -> Result<(), IndicatorError> {
    if bar.is_well_formed() {
        Ok(())
    } else {
        Err(IndicatorError::MalformedBar { index })
    }
}
