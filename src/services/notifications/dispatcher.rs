use super::format::summary_message;
use super::{Notifier, TelegramNotifier, WebhookNotifier};
use crate::config::NotificationConfig;
use crate::core::runtime::CycleReport;
use crate::models::Alert;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of probing one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub channel: String,
    pub connected: bool,
    pub detail: String,
}

/// Fans an alert out to every configured channel
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Build channels from configuration, skipping any without credentials
    pub fn from_config(config: &NotificationConfig, timeout: Duration) -> Self {
        let mut dispatcher = Self::new();

        if config.telegram_bot_token.is_empty() || config.telegram_chat_id.is_empty() {
            info!("Notifications: Telegram not configured, channel disabled");
        } else {
            match TelegramNotifier::new(
                &config.telegram_api_url,
                &config.telegram_bot_token,
                &config.telegram_chat_id,
                timeout,
            ) {
                Ok(notifier) => dispatcher = dispatcher.with_notifier(Arc::new(notifier)),
                Err(e) => warn!(error = %e, "Notifications: failed to build Telegram client"),
            }
        }

        if config.webhook_url.is_empty() {
            info!("Notifications: webhook not configured, channel disabled");
        } else {
            match WebhookNotifier::new(&config.webhook_url, timeout) {
                Ok(notifier) => dispatcher = dispatcher.with_notifier(Arc::new(notifier)),
                Err(e) => warn!(error = %e, "Notifications: failed to build webhook client"),
            }
        }

        dispatcher
    }

    pub fn channels(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub async fn dispatch(&self, alert: &Alert) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for notifier in &self.notifiers {
            match notifier.send_alert(alert).await {
                Ok(()) => {
                    info!(
                        channel = notifier.name(),
                        instrument = %alert.instrument,
                        direction = %alert.direction,
                        "Notifications: delivered {} alert via {}",
                        alert.instrument,
                        notifier.name()
                    );
                    report.delivered.push(notifier.name().to_string());
                }
                Err(e) => {
                    warn!(
                        channel = notifier.name(),
                        instrument = %alert.instrument,
                        error = %e,
                        "Notifications: {} delivery failed for {}",
                        notifier.name(),
                        alert.instrument
                    );
                    report.failed.push(notifier.name().to_string());
                }
            }
        }
        report
    }

    pub async fn send_text(&self, text: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for notifier in &self.notifiers {
            match notifier.send_text(text).await {
                Ok(()) => report.delivered.push(notifier.name().to_string()),
                Err(e) => {
                    warn!(channel = notifier.name(), error = %e, "Notifications: text delivery via {} failed", notifier.name());
                    report.failed.push(notifier.name().to_string());
                }
            }
        }
        report
    }

    /// Send one summary of the cycle's emitted alerts to every channel
    pub async fn send_summary(&self, report: &CycleReport) -> DeliveryReport {
        self.send_text(&summary_message(&report.alerts)).await
    }

    pub async fn check_connections(&self) -> Vec<ChannelStatus> {
        let mut statuses = Vec::with_capacity(self.notifiers.len());
        for notifier in &self.notifiers {
            let status = match notifier.check_connection().await {
                Ok(detail) => ChannelStatus {
                    channel: notifier.name().to_string(),
                    connected: true,
                    detail,
                },
                Err(e) => {
                    warn!(channel = notifier.name(), error = %e, "Notifications: {} connection check failed", notifier.name());
                    ChannelStatus {
                        channel: notifier.name().to_string(),
                        connected: false,
                        detail: e.to_string(),
                    }
                }
            };
            statuses.push(status);
        }
        statuses
    }
}
