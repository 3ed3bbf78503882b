//! Numeric primitives over plain `f64` series

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// EMA series seeded with the SMA of the first `period` values.
///
/// Element `j` of the result is the EMA at input index `period - 1 + j`, so the
/// output has `values.len() - period + 1` entries. Empty when there are fewer
/// than `period` values or `period` is zero.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        // Incremental form keeps a constant series exactly constant
        let ema = prev + k * (value - prev);
        result.push(ema);
        prev = ema;
    }

    result
}

/// Highest value; callers validate finiteness first
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Lowest value
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}
