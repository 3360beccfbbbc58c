use chrono::{DateTime, Local};

use crate::models::domain::{Severity, ThreatAlert};

const RESET: &str = "\x1b[0m";

/// `"{h}h {m}m"`, both floored.
pub fn format_uptime(uptime_secs: f64) -> String {
    let total = if uptime_secs.is_finite() && uptime_secs > 0.0 {
        uptime_secs.floor() as u64
    } else {
        0
    };
    format!("{}h {}m", total / 3600, (total % 3600) / 60)
}

pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[1;31m",
        Severity::High => "\x1b[33m",
        Severity::Medium => "\x1b[34m",
        Severity::Low => "\x1b[32m",
        Severity::Unknown => "\x1b[2m",
    }
}

/// `[CRITICAL]`, optionally wrapped in the severity colour.
pub fn severity_badge(severity: Severity, color: bool) -> String {
    if color {
        format!("{}[{}]{RESET}", severity_color(severity), severity.as_str())
    } else {
        format!("[{}]", severity.as_str())
    }
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", (confidence * 100.0).clamp(0.0, 100.0))
}

pub fn format_clock(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

pub fn format_alert_time(alert: &ThreatAlert) -> String {
    alert
        .occurred_at()
        .map(format_clock)
        .unwrap_or_else(|| "--:--:--".to_string())
}

pub fn rssi_quality(rssi_dbm: i32) -> &'static str {
    match rssi_dbm {
        r if r >= -50 => "excellent",
        r if r >= -60 => "good",
        r if r >= -70 => "fair",
        _ => "weak",
    }
}

/// Block sparkline of RSSI values scaled over -95..=-20 dBm.
pub fn sparkline(values: &[i32]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    values
        .iter()
        .map(|v| {
            let clamped = (*v).clamp(-95, -20);
            let index = ((clamped + 95) as usize * (BARS.len() - 1)) / 75;
            BARS[index]
        })
        .collect()
}

pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
