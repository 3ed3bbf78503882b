//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics and the admin surface.


use emasentry::services::notifications::{NotificationDispatcher, TelegramNotifier, WebhookNotifier};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "emasentry");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for metric in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "analysis_cycles_total",
        "alerts_emitted_total",
    ] {
        assert!(body.contains(metric), "Expected {} metric", metric);
    }
}

#[tokio::test]
async fn status_endpoint_before_any_cycle() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/status").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["instruments"], json!(["BTCUSDT", "ETHUSDT"]));
    assert_eq!(body["cycles_completed"], 0);
    assert_eq!(body["cycle_running"], false);
    assert!(body["last_cycle"].is_null());
    assert_eq!(body["cooldowns"]["tracked"], 0);
    assert_eq!(body["alert_history"]["capacity"], 100);
}

#[tokio::test]
async fn triggering_a_cycle_emits_and_records_alert() {
    let app = TestApiServer::new().await;

    let response = app.server.post("/api/cycles").await;
    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["evaluated"], 2);
    assert_eq!(report["emitted"], 1);
    assert_eq!(report["alerts"][0]["instrument"], "BTCUSDT");
    assert_eq!(report["alerts"][0]["direction"], "bullish");
    assert_eq!(report["alerts"][0]["class"], "confirmed");

    let alerts: Value = app.server.get("/api/alerts").await.json();
    assert_eq!(alerts.as_array().map(Vec::len), Some(1));

    let status: Value = app.server.get("/status").await.json();
    assert_eq!(status["cycles_completed"], 1);
    assert_eq!(status["cooldowns"]["active"], 1);
    assert_eq!(status["last_cycle"]["emitted"], 1);

    // Same bars again: the confirmed cooldown suppresses it
    let again: Value = app.server.post("/api/cycles").await.json();
    assert_eq!(again["emitted"], 0);
    assert_eq!(again["suppressed"], 1);
}

#[tokio::test]
async fn alerts_endpoint_filters_and_limits() {
    let app = TestApiServer::new().await;
    app.server.post("/api/cycles").await;

    let btc: Value = app
        .server
        .get("/api/alerts")
        .add_query_param("instrument", "btcusdt")
        .await
        .json();
    assert_eq!(btc.as_array().map(Vec::len), Some(1));

    let eth: Value = app
        .server
        .get("/api/alerts")
        .add_query_param("instrument", "ETHUSDT")
        .await
        .json();
    assert_eq!(eth.as_array().map(Vec::len), Some(0));

    let none: Value = app
        .server
        .get("/api/alerts")
        .add_query_param("limit", 0)
        .await
        .json();
    assert_eq!(none.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn cooldowns_can_be_listed_and_cleared() {
    let app = TestApiServer::new().await;
    app.server.post("/api/cycles").await;

    let listed: Value = app.server.get("/api/cooldowns").await.json();
    let entries = listed.as_array().expect("array of cooldowns");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["instrument"], "BTCUSDT");
    assert_eq!(entries[0]["class"], "confirmed");
    assert_eq!(entries[0]["active"], true);

    // Wrong class leaves the record alone
    let response = app
        .server
        .delete("/api/cooldowns/BTCUSDT")
        .add_query_param("direction", "bullish")
        .add_query_param("class", "base")
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["removed"], 0);

    let response = app
        .server
        .delete("/api/cooldowns/btcusdt")
        .add_query_param("direction", "long")
        .add_query_param("class", "confirmed")
        .await;
    assert_eq!(response.json::<Value>()["removed"], 1);
    assert!(app.runtime.cooldowns().is_empty());

    // Cleared: the next cycle emits again
    let report: Value = app.server.post("/api/cycles").await.json();
    assert_eq!(report["emitted"], 1);

    let cleared: Value = app.server.delete("/api/cooldowns").await.json();
    assert_eq!(cleared["removed"], 1);
}

#[tokio::test]
async fn invalid_cooldown_filters_are_rejected() {
    let app = TestApiServer::new().await;

    let response = app
        .server
        .delete("/api/cooldowns/BTCUSDT")
        .add_query_param("direction", "sideways")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .delete("/api/cooldowns/BTCUSDT")
        .add_query_param("class", "premium")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_notification_without_channels_is_unavailable() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/api/notifications/test")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn health_degrades_when_no_instrument_has_data() {
    let app = TestApiServer::without_market_data().await;
    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");

    let report: Value = app.server.post("/api/cycles").await.json();
    assert_eq!(report["failed"], 1);
    assert_eq!(report["evaluated"], 0);

    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn notification_status_without_channels() {
    let app = TestApiServer::new().await;
    let body: Value = app.server.get("/api/notifications/status").await.json();
    assert_eq!(body["overall_status"], "not_configured");
    assert_eq!(body["channels"], json!([]));
}

#[tokio::test]
async fn notification_status_checks_each_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/botTOKEN/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"username": "ema_sentry_bot"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hooks/ios"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let telegram = TelegramNotifier::new(server.uri(), "TOKEN", "42", Duration::from_secs(5))
        .expect("telegram client");
    let webhook = WebhookNotifier::new(format!("{}/hooks/ios", server.uri()), Duration::from_secs(5))
        .expect("webhook client");
    let app = TestApiServer::with_dispatcher(
        NotificationDispatcher::new()
            .with_notifier(Arc::new(telegram))
            .with_notifier(Arc::new(webhook)),
    )
    .await;

    let response = app.server.get("/api/notifications/status").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["overall_status"], "healthy");
    assert_eq!(body["channels"][0]["channel"], "telegram");
    assert_eq!(body["channels"][0]["connected"], true);
    assert_eq!(body["channels"][0]["detail"], "bot connected: @ema_sentry_bot");
    assert_eq!(body["channels"][1]["channel"], "webhook");
    assert_eq!(body["channels"][1]["connected"], false);
}
