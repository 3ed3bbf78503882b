//! Integration tests for the Binance kline provider against a mocked API

use chrono::{Duration, TimeZone, Utc};
use emasentry::services::binance::BinanceMarketDataProvider;
use emasentry::services::market_data::{MarketDataError, MarketDataProvider};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn klines(count: i64) -> Value {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            let open = start + Duration::minutes(15 * i);
            let close = open + Duration::minutes(15) - Duration::milliseconds(1);
            json!([
                open.timestamp_millis(),
                "100.0",
                "101.0",
                "99.0",
                format!("{}.5", 100 + i),
                "1000.0",
                close.timestamp_millis(),
                "100000.0",
                10,
                "500.0",
                "50000.0",
                "0"
            ])
        })
        .collect();
    Value::Array(rows)
}

fn provider(server: &MockServer, max_retries: usize) -> BinanceMarketDataProvider {
    BinanceMarketDataProvider::with_client(server.uri(), reqwest::Client::new(), "15m", max_retries)
        .with_min_retry_delay(std::time::Duration::from_millis(1))
}

#[tokio::test]
async fn fetches_and_parses_klines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "15m"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(klines(3)))
        .expect(1)
        .mount(&server)
        .await;

    let bars = assert_ok!(provider(&server, 3).get_bars("BTCUSDT", 3).await);
    assert_eq!(bars.len(), 3);
    assert_eq!(bars[0].close, 100.5);
    assert_eq!(bars[2].close, 102.5);
    assert!(bars[0].timestamp < bars[1].timestamp);
}

#[tokio::test]
async fn retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(klines(5)))
        .expect(1)
        .mount(&server)
        .await;

    let bars = assert_ok!(provider(&server, 3).get_bars("ETHUSDT", 5).await);
    assert_eq!(bars.len(), 5);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = assert_err!(provider(&server, 3).get_bars("NOPE", 10).await);
    match err {
        MarketDataError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Invalid symbol"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = assert_err!(provider(&server, 2).get_bars("BTCUSDT", 10).await);
    assert!(err.is_transient());
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let err = assert_err!(provider(&server, 3).get_bars("BTCUSDT", 10).await);
    assert!(matches!(err, MarketDataError::Decode(_)));
}
