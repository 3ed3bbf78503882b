//! Unit tests for the alert history

use crate::fixtures::start_time;
use chrono::Duration;
use emasentry::models::{Alert, RawSignal, ScoredSignal, SignalClass, SignalDirection};
use emasentry::signals::AlertHistory;

fn alert(instrument: &str, minute: i64) -> Alert {
    let scored = ScoredSignal {
        raw: RawSignal {
            direction: SignalDirection::Bullish,
            price: 100.0 + minute as f64,
            ..RawSignal::none(instrument)
        },
        strength: 0.8,
        confidence: 3,
        class: SignalClass::Base,
    };
    Alert::from_scored(&scored, start_time() + Duration::minutes(minute))
}

#[test]
fn test_history_evicts_oldest_at_capacity() {
    let history = AlertHistory::new(3);
    for minute in 0..5 {
        history.push(alert("BTCUSDT", minute));
    }

    assert_eq!(history.len(), 3);
    let recent = history.recent(10, None);
    let minutes: Vec<f64> = recent.iter().map(|a| a.price - 100.0).collect();
    assert_eq!(minutes, vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_recent_limit_keeps_newest_in_order() {
    let history = AlertHistory::new(10);
    for minute in 0..6 {
        history.push(alert("BTCUSDT", minute));
    }

    let recent = history.recent(2, None);
    assert_eq!(recent.len(), 2);
    assert!(recent[0].emitted_at < recent[1].emitted_at);
    assert_eq!(recent[1].emitted_at, start_time() + Duration::minutes(5));
}

#[test]
fn test_recent_filters_by_instrument() {
    let history = AlertHistory::new(10);
    history.push(alert("BTCUSDT", 0));
    history.push(alert("ETHUSDT", 1));
    history.push(alert("BTCUSDT", 2));

    let btc = history.recent(10, Some("BTCUSDT"));
    assert_eq!(btc.len(), 2);
    assert!(btc.iter().all(|a| a.instrument == "BTCUSDT"));
    assert!(history.recent(10, Some("DOGEUSDT")).is_empty());
}

#[test]
fn test_zero_capacity_is_raised_to_one() {
    let history = AlertHistory::new(0);
    assert_eq!(history.capacity(), 1);
    history.push(alert("BTCUSDT", 0));
    history.push(alert("BTCUSDT", 1));
    assert_eq!(history.len(), 1);
    assert!(!history.is_empty());
}
