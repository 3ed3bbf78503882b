//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::core::runtime::{CycleOutcome, SignalRuntime};
use crate::metrics::Metrics;
use crate::models::{SignalClass, SignalDirection};

const SERVICE_NAME: &str = "emasentry";
const DEFAULT_ALERT_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub runtime: Arc<SignalRuntime>,
}

impl AppState {
    pub fn new(runtime: Arc<SignalRuntime>, metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            start_time: Arc::new(Instant::now()),
            runtime,
        }
    }
}

/// "degraded" when the last completed cycle could not fetch data for any
/// instrument, "healthy" otherwise
pub fn health_status(runtime: &SignalRuntime) -> &'static str {
    match runtime.last_report() {
        Some(report) if report.failed > 0 && report.evaluated == 0 => "degraded",
        _ => "healthy",
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health_status(&state.runtime),
        "uptime_seconds": uptime_seconds,
        "service": SERVICE_NAME
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    let runtime = &state.runtime;
    let now = chrono::Utc::now();
    let cooldowns = runtime.cooldowns().snapshot();
    let active = cooldowns.iter().filter(|c| c.is_active(now)).count();

    Json(json!({
        "service": SERVICE_NAME,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "instruments": runtime.config().instruments,
        "cycle_running": runtime.is_cycle_running(),
        "cycles_completed": runtime.cycles_completed(),
        "cycles_skipped": runtime.cycles_skipped(),
        "last_cycle": runtime.last_report(),
        "cooldowns": {
            "tracked": cooldowns.len(),
            "active": active,
        },
        "alert_history": {
            "size": runtime.history().len(),
            "capacity": runtime.history().capacity(),
        },
        "notification_channels": runtime.dispatcher().channels(),
    }))
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Trigger one analysis cycle and wait for its report
async fn trigger_cycle(State(state): State<AppState>) -> Response {
    match state.runtime.run_cycle().await {
        CycleOutcome::Completed(report) => Json(report).into_response(),
        CycleOutcome::Skipped => {
            error_response(StatusCode::CONFLICT, "an analysis cycle is already running")
        }
    }
}

async fn list_cooldowns(State(state): State<AppState>) -> Json<Value> {
    let now = chrono::Utc::now();
    let entries: Vec<Value> = state
        .runtime
        .cooldowns()
        .snapshot()
        .into_iter()
        .map(|entry| {
            json!({
                "instrument": entry.instrument,
                "direction": entry.direction,
                "class": entry.class,
                "last_emitted_at": entry.last_emitted_at,
                "expires_at": entry.expires_at,
                "active": entry.is_active(now),
                "remaining_seconds": entry.remaining_seconds(now),
            })
        })
        .collect();
    Json(json!(entries))
}

async fn clear_all_cooldowns(State(state): State<AppState>) -> Json<Value> {
    let removed = state.runtime.cooldowns().clear_all();
    Json(json!({ "removed": removed }))
}

#[derive(Debug, Deserialize)]
struct ClearCooldownQuery {
    direction: Option<String>,
    class: Option<String>,
}

async fn clear_cooldowns(
    State(state): State<AppState>,
    Path(instrument): Path<String>,
    Query(params): Query<ClearCooldownQuery>,
) -> Response {
    let direction = match params.direction.as_deref().map(str::parse::<SignalDirection>) {
        None => None,
        Some(Ok(direction)) => Some(direction),
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let class = match params.class.as_deref().map(str::parse::<SignalClass>) {
        None => None,
        Some(Ok(class)) => Some(class),
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let instrument = instrument.to_uppercase();
    let removed = state.runtime.cooldowns().clear(&instrument, direction, class);
    Json(json!({ "instrument": instrument, "removed": removed })).into_response()
}

#[derive(Debug, Deserialize)]
struct AlertQuery {
    limit: Option<usize>,
    instrument: Option<String>,
}

async fn list_alerts(State(state): State<AppState>, Query(params): Query<AlertQuery>) -> Json<Value> {
    let limit = params.limit.unwrap_or(DEFAULT_ALERT_LIMIT);
    let instrument = params.instrument.map(|i| i.to_uppercase());
    let alerts = state.runtime.history().recent(limit, instrument.as_deref());
    Json(json!(alerts))
}

async fn test_notification(State(state): State<AppState>) -> Response {
    let dispatcher = state.runtime.dispatcher();
    if dispatcher.is_empty() {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "no notification channels configured",
        );
    }

    let report = dispatcher
        .send_text("emasentry test notification: delivery is working")
        .await;
    if report.all_delivered() {
        Json(report).into_response()
    } else {
        warn!(failed = ?report.failed, "Notifications: test message failed on some channels");
        (StatusCode::BAD_GATEWAY, Json(report)).into_response()
    }
}

/// Check every configured channel without sending a message
async fn notification_status(State(state): State<AppState>) -> Json<Value> {
    let channels = state.runtime.dispatcher().check_connections().await;
    let overall = if channels.is_empty() {
        "not_configured"
    } else if channels.iter().any(|c| c.connected) {
        "healthy"
    } else {
        "unhealthy"
    };
    Json(json!({
        "overall_status": overall,
        "channels": channels,
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .route("/api/cycles", post(trigger_cycle))
        .route("/api/cooldowns", get(list_cooldowns))
        .route("/api/cooldowns", delete(clear_all_cooldowns))
        .route("/api/cooldowns/{instrument}", delete(clear_cooldowns))
        .route("/api/alerts", get(list_alerts))
        .route("/api/notifications/test", post(test_notification))
        .route("/api/notifications/status", get(notification_status))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
