//! Prometheus metrics for the HTTP layer and the analysis pipeline

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,

    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,

    pub analysis_cycles_total: IntCounter,
    pub analysis_cycles_skipped_total: IntCounter,
    pub analysis_cycle_duration_seconds: Histogram,
    pub crossovers_detected_total: IntCounter,
    pub signals_below_threshold_total: IntCounter,
    pub alerts_emitted_total: IntCounter,
    pub alerts_suppressed_total: IntCounter,
    pub market_data_failures_total: IntCounter,
    pub notification_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;

        let analysis_cycles_total =
            IntCounter::new("analysis_cycles_total", "Completed analysis cycles")?;
        let analysis_cycles_skipped_total = IntCounter::new(
            "analysis_cycles_skipped_total",
            "Cycle triggers skipped because a cycle was already running",
        )?;
        let analysis_cycle_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "analysis_cycle_duration_seconds",
            "Wall time of one analysis cycle in seconds",
        ))?;
        let crossovers_detected_total =
            IntCounter::new("crossovers_detected_total", "EMA crossovers detected")?;
        let signals_below_threshold_total = IntCounter::new(
            "signals_below_threshold_total",
            "Crossovers discarded by the minimum strength gate",
        )?;
        let alerts_emitted_total = IntCounter::new("alerts_emitted_total", "Alerts emitted")?;
        let alerts_suppressed_total = IntCounter::new(
            "alerts_suppressed_total",
            "Scored signals suppressed by an active cooldown",
        )?;
        let market_data_failures_total = IntCounter::new(
            "market_data_failures_total",
            "Instruments skipped because bars could not be fetched",
        )?;
        let notification_failures_total = IntCounter::new(
            "notification_failures_total",
            "Failed notification deliveries across all channels",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(analysis_cycles_total.clone()))?;
        registry.register(Box::new(analysis_cycles_skipped_total.clone()))?;
        registry.register(Box::new(analysis_cycle_duration_seconds.clone()))?;
        registry.register(Box::new(crossovers_detected_total.clone()))?;
        registry.register(Box::new(signals_below_threshold_total.clone()))?;
        registry.register(Box::new(alerts_emitted_total.clone()))?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;
        registry.register(Box::new(market_data_failures_total.clone()))?;
        registry.register(Box::new(notification_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            analysis_cycles_total,
            analysis_cycles_skipped_total,
            analysis_cycle_duration_seconds,
            crossovers_detected_total,
            signals_below_threshold_total,
            alerts_emitted_total,
            alerts_suppressed_total,
            market_data_failures_total,
            notification_failures_total,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
