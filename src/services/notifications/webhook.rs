//! Generic JSON webhook channel (iOS Shortcuts automation endpoint)

use super::format::{alert_lines, alert_title};
use super::{NotificationError, Notifier};
use crate::models::{Alert, SignalClass};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    message: &'a str,
    priority: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Request(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn post(&self, payload: &WebhookPayload<'_>) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let description = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                description,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send_alert(&self, alert: &Alert) -> Result<(), NotificationError> {
        let title = alert_title(alert);
        let message = alert_lines(alert).join("\n");
        let priority = match alert.class {
            SignalClass::Confirmed => "high",
            SignalClass::Base => "normal",
        };
        self.post(&WebhookPayload {
            title: &title,
            message: &message,
            priority,
            price: Some(alert.price),
        })
        .await
    }

    async fn send_text(&self, text: &str) -> Result<(), NotificationError> {
        self.post(&WebhookPayload {
            title: "emasentry",
            message: text,
            priority: "normal",
            price: None,
        })
        .await
    }

    /// Plain GET against the webhook URL; any 2xx counts as reachable
    async fn check_connection(&self) -> Result<String, NotificationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                description: format!("webhook responded with status {}", status.as_u16()),
            });
        }
        Ok(format!("webhook responded with status {}", status.as_u16()))
    }
}
