//! Integration tests for notification channels against mocked endpoints

use chrono::{TimeZone, Utc};
use emasentry::core::runtime::CycleReport;
use emasentry::models::{Alert, Confirmation, SignalClass, SignalDirection};
use emasentry::services::notifications::{
    NotificationDispatcher, NotificationError, Notifier, TelegramNotifier, WebhookNotifier,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alert() -> Alert {
    Alert {
        instrument: "ETHUSDT".to_string(),
        direction: SignalDirection::Bearish,
        class: SignalClass::Confirmed,
        strength: 0.8,
        confidence: 3,
        fast_ema: 2990.0,
        slow_ema: 3000.0,
        separation: -0.00333,
        bos: Confirmation::detected(2995.0, true),
        choch: Confirmation::absent(),
        price: 2980.0,
        emitted_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

fn telegram(server: &MockServer) -> TelegramNotifier {
    TelegramNotifier::new(server.uri(), "TEST-TOKEN", "-100123", Duration::from_secs(5))
        .expect("telegram client")
}

#[tokio::test]
async fn telegram_sends_html_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST-TOKEN/sendMessage"))
        .and(body_partial_json(json!({"chat_id": "-100123", "parse_mode": "HTML"})))
        .and(body_string_contains("SHORT SIGNAL: ETHUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(telegram(&server).send_alert(&alert()).await);
}

#[tokio::test]
async fn telegram_api_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST-TOKEN/sendMessage"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"ok": false, "description": "Bad Request: chat not found"})),
        )
        .mount(&server)
        .await;

    let err = assert_err!(telegram(&server).send_text("hello").await);
    match err {
        NotificationError::Rejected { status, description } => {
            assert_eq!(status, 400);
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn webhook_posts_title_message_and_priority() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/ios"))
        .and(body_partial_json(json!({
            "title": "SHORT SIGNAL: ETHUSDT",
            "priority": "high",
            "price": 2980.0
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookNotifier::new(format!("{}/hooks/ios", server.uri()), Duration::from_secs(5))
        .expect("webhook client");
    assert_ok!(webhook.send_alert(&alert()).await);
}

#[tokio::test]
async fn dispatcher_fails_forward_across_channels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST-TOKEN/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hooks/ios"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookNotifier::new(format!("{}/hooks/ios", server.uri()), Duration::from_secs(5))
        .expect("webhook client");
    let dispatcher = NotificationDispatcher::new()
        .with_notifier(Arc::new(webhook))
        .with_notifier(Arc::new(telegram(&server)));

    let report = dispatcher.dispatch(&alert()).await;
    assert_eq!(report.delivered, vec!["telegram"]);
    assert_eq!(report.failed, vec!["webhook"]);
}

#[tokio::test]
async fn telegram_connection_check_uses_get_me() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/botTEST-TOKEN/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"id": 42, "is_bot": true, "username": "ema_sentry_bot"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = assert_ok!(telegram(&server).check_connection().await);
    assert_eq!(detail, "bot connected: @ema_sentry_bot");
}

#[tokio::test]
async fn telegram_connection_check_reports_bad_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/botTEST-TOKEN/getMe"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"ok": false, "description": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    let err = assert_err!(telegram(&server).check_connection().await);
    assert!(matches!(err, NotificationError::Rejected { status: 401, .. }));
}

#[tokio::test]
async fn webhook_connection_check_requires_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hooks/ios"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let up = WebhookNotifier::new(format!("{}/hooks/ios", server.uri()), Duration::from_secs(5))
        .expect("webhook client");
    let detail = assert_ok!(up.check_connection().await);
    assert_eq!(detail, "webhook responded with status 200");

    let missing = WebhookNotifier::new(format!("{}/hooks/gone", server.uri()), Duration::from_secs(5))
        .expect("webhook client");
    let err = assert_err!(missing.check_connection().await);
    assert!(matches!(err, NotificationError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn cycle_summary_reaches_every_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST-TOKEN/sendMessage"))
        .and(body_string_contains("Market Summary"))
        .and(body_string_contains("SHORT ETHUSDT: CONFIRMED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hooks/ios"))
        .and(body_partial_json(json!({"title": "emasentry", "priority": "normal"})))
        .and(body_string_contains("Confirmed: 1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookNotifier::new(format!("{}/hooks/ios", server.uri()), Duration::from_secs(5))
        .expect("webhook client");
    let dispatcher = NotificationDispatcher::new()
        .with_notifier(Arc::new(telegram(&server)))
        .with_notifier(Arc::new(webhook));

    let report = CycleReport {
        emitted: 1,
        alerts: vec![alert()],
        ..CycleReport::default()
    };
    let delivery = dispatcher.send_summary(&report).await;
    assert!(delivery.all_delivered());
    assert_eq!(delivery.delivered, vec!["telegram", "webhook"]);
}
