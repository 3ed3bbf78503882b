//! Unit tests for numeric helpers

use emasentry::common::math::{ema_series, max, mean, min};

#[test]
fn test_mean_empty_is_none() {
    assert!(mean(&[]).is_none());
    assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
}

#[test]
fn test_ema_series_seeded_with_sma() {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0];
    let series = ema_series(&values, 3);
    assert_eq!(series.len(), 3);
    assert!((series[0] - 2.0).abs() < 1e-12);
    // k = 0.5: 4 * 0.5 + 2 * 0.5 = 3, then 5 * 0.5 + 3 * 0.5 = 4
    assert!((series[1] - 3.0).abs() < 1e-12);
    assert!((series[2] - 4.0).abs() < 1e-12);
}

#[test]
fn test_ema_series_short_input_is_empty() {
    assert!(ema_series(&[1.0, 2.0], 3).is_empty());
    assert!(ema_series(&[1.0, 2.0], 0).is_empty());
}

#[test]
fn test_ema_of_constant_series_is_constant() {
    let values = vec![42.5; 200];
    for period in [1, 9, 20, 50] {
        let series = ema_series(&values, period);
        assert_eq!(series.len(), values.len() - period + 1);
        assert!(series.iter().all(|&v| v == 42.5), "period {} drifted", period);
    }
}

#[test]
fn test_max_min() {
    let values = [3.0, -1.0, 7.5, 2.0];
    assert_eq!(max(&values), Some(7.5));
    assert_eq!(min(&values), Some(-1.0));
    assert!(max(&[]).is_none());
}
