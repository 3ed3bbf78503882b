//! Alert delivery channels

pub mod dispatcher;
pub mod format;
pub mod telegram;
pub mod webhook;

pub use dispatcher::{ChannelStatus, DeliveryReport, NotificationDispatcher};
pub use telegram::TelegramNotifier;
pub use webhook::WebhookNotifier;

use crate::models::Alert;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification request failed: {0}")]
    Request(String),

    #[error("notification rejected with status {status}: {description}")]
    Rejected { status: u16, description: String },
}

/// A single outbound channel. Delivery is best-effort: a failed send never
/// undoes the cooldown or history update that preceded it.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send_alert(&self, alert: &Alert) -> Result<(), NotificationError>;

    async fn send_text(&self, text: &str) -> Result<(), NotificationError>;

    /// Reach the channel without delivering a message; returns a short
    /// description of what answered
    async fn check_connection(&self) -> Result<String, NotificationError>;
}
