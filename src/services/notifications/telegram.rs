//! Telegram Bot API channel (`sendMessage`, HTML parse mode)

use super::format::{escape_html, html_message};
use super::{NotificationError, Notifier};
use crate::models::Alert;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// `getMe`: verifies the token and reports the bot's username
    async fn get_me(&self) -> Result<String, NotificationError> {
        let url = format!("{}/bot{}/getMe", self.api_url, self.bot_token);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() || body.get("ok").and_then(Value::as_bool) != Some(true) {
            return Err(rejection(status.as_u16(), &body));
        }

        let username = body
            .pointer("/result/username")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Ok(format!("bot connected: @{}", username))
    }

    async fn send_message(&self, text: &str) -> Result<(), NotificationError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() || body.get("ok").and_then(Value::as_bool) != Some(true) {
            return Err(rejection(status.as_u16(), &body));
        }

        Ok(())
    }
}

fn rejection(status: u16, body: &Value) -> NotificationError {
    let description = body
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    NotificationError::Rejected {
        status,
        description,
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send_alert(&self, alert: &Alert) -> Result<(), NotificationError> {
        self.send_message(&html_message(alert)).await
    }

    async fn send_text(&self, text: &str) -> Result<(), NotificationError> {
        self.send_message(&escape_html(text)).await
    }

    async fn check_connection(&self) -> Result<String, NotificationError> {
        self.get_me().await
    }
}
