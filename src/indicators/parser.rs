use crate::indicators::error::IndicatorError;
use crate::indicators::validation::validate_bar;
use crate::models::Bar;
use chrono::{DateTime, Utc};

pub fn parse_f64(value: &str) -> Result<f64, IndicatorError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| IndicatorError::InvalidNumericFormat(value.to_string()))
}

/// Build a bar from exchange string fields (open, high, low, close, volume)
pub fn parse_bar(
    fields: [&str; 5],
    timestamp: DateTime<Utc>,
    index: usize,
) -> Result<Bar, IndicatorError> {
    let [open, high, low, close, volume] = fields;
    let bar = Bar::new(
        parse_f64(open)?,
        parse_f64(high)?,
        parse_f64(low)?,
        parse_f64(close)?,
        parse_f64(volume)?,
        timestamp,
    );
    validate_bar(&bar, index)?;
    Ok(bar)
}
