//! Human-readable alert rendering shared by the notification channels

use crate::models::{Alert, Confirmation, SignalClass, SignalDirection};

fn action(direction: SignalDirection) -> &'static str {
    match direction {
        SignalDirection::Bullish => "LONG",
        SignalDirection::Bearish => "SHORT",
        SignalDirection::None => "NONE",
    }
}

/// Headline such as "LONG SIGNAL: BTCUSDT" (confirmed) or "SHORT ALERT: ETHUSDT" (base)
pub fn alert_title(alert: &Alert) -> String {
    let kind = match alert.class {
        SignalClass::Confirmed => "SIGNAL",
        SignalClass::Base => "ALERT",
    };
    format!("{} {}: {}", action(alert.direction), kind, alert.instrument)
}

pub fn confidence_label(confidence: u8) -> &'static str {
    match confidence {
        4..=u8::MAX => "HIGH CONFIDENCE",
        3 => "MEDIUM CONFIDENCE",
        _ => "LOW CONFIDENCE",
    }
}

fn confirmation_line(name: &str, confirmation: &Confirmation) -> Option<String> {
    if !confirmation.detected {
        return None;
    }
    let volume = if confirmation.volume_backed {
        "volume confirmed"
    } else {
        "no volume"
    };
    Some(match confirmation.level {
        Some(level) => format!("{} @ {:.4} ({})", name, level, volume),
        None => format!("{} ({})", name, volume),
    })
}

/// Body lines without markup; channels decorate them as they need
pub fn alert_lines(alert: &Alert) -> Vec<String> {
    let mut lines = vec![
        format!("Strength: {:.1}%", alert.strength * 100.0),
        format!("Confidence: {}/5", alert.confidence),
        format!("Price: {:.4}", alert.price),
        format!("Fast EMA: {:.4}", alert.fast_ema),
        format!("Slow EMA: {:.4}", alert.slow_ema),
        format!("EMA Separation: {:.3}%", alert.separation * 100.0),
    ];

    let confirmations: Vec<String> = [("BOS", &alert.bos), ("CHOCH", &alert.choch)]
        .iter()
        .filter_map(|(name, c)| confirmation_line(name, c))
        .collect();
    if !confirmations.is_empty() {
        lines.push(format!("Confirmations: {}", confirmations.join(" | ")));
    }

    lines.push(format!(
        "Action: {} - {}",
        action(alert.direction),
        confidence_label(alert.confidence)
    ));
    lines.push(format!(
        "Generated: {}",
        alert.emitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines
}

/// Plain-text message: title line followed by the body
pub fn plain_message(alert: &Alert) -> String {
    let mut lines = vec![alert_title(alert)];
    lines.extend(alert_lines(alert));
    lines.join("\n")
}

/// Telegram HTML message
pub fn html_message(alert: &Alert) -> String {
    let mut lines = vec![format!("<b>{}</b>", escape_html(&alert_title(alert)))];
    lines.extend(alert_lines(alert).iter().map(|l| escape_html(l)));
    lines.join("\n")
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One message summarising the alerts a cycle emitted
pub fn summary_message(alerts: &[Alert]) -> String {
    let confirmed = alerts
        .iter()
        .filter(|a| a.class == SignalClass::Confirmed)
        .count();

    let mut lines = vec![
        "Market Summary".to_string(),
        format!("Total Signals: {}", alerts.len()),
        format!("Confirmed: {}", confirmed),
        format!("Base Alerts: {}", alerts.len() - confirmed),
    ];
    if !alerts.is_empty() {
        lines.push(String::new());
        lines.push("Active Signals:".to_string());
        lines.extend(alerts.iter().map(|a| {
            let class = match a.class {
                SignalClass::Confirmed => "CONFIRMED",
                SignalClass::Base => "BASE",
            };
            format!("{} {}: {}", action(a.direction), a.instrument, class)
        }));
    }
    lines.join("\n")
}
