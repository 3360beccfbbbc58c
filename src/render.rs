//! Plain-text frames for the terminal.

use crate::alerts::AlertBook;
use crate::format::{
    format_alert_time, format_clock, format_confidence, format_count, format_uptime,
    rssi_quality, severity_badge, sparkline,
};
use crate::models::domain::{Device, SystemStatus};
use crate::notify::Notification;
use crate::views::{AlertsView, DataSource, DevicesView, SignalView, StatusView};

/// Clear screen and move the cursor home.
pub const CLEAR: &str = "\x1b[2J\x1b[H";

/// Everything one frame shows, borrowed from the views.
pub struct Frame<'a> {
    pub status: &'a StatusView,
    pub alerts: &'a AlertsView,
    pub devices: &'a DevicesView,
    pub signal: &'a SignalView,
    pub active_alerts: usize,
    pub notifications: &'a [Notification],
    pub mock_mode: bool,
    pub color: bool,
}

pub fn render_frame(frame: &Frame<'_>) -> String {
    let mut out = String::new();
    out.push_str(&render_header(frame));
    out.push('\n');
    out.push_str(&render_status(frame.status.status(), frame.status.source()));
    out.push('\n');
    out.push_str(&render_alerts(frame.alerts.book(), frame.alerts.source(), frame.color));
    out.push('\n');
    out.push_str(&render_analytics(frame.alerts.book(), frame.color));
    out.push('\n');
    out.push_str(&render_devices(frame.devices.devices()));
    out.push('\n');
    out.push_str(&render_signal(frame.signal));
    if !frame.notifications.is_empty() {
        out.push('\n');
        out.push_str(&render_notifications(frame.notifications));
    }
    out.push('\n');
    out.push_str("keys: r <n> resolve · ");
    if frame.mock_mode {
        out.push_str("t <n> toggle · ");
    }
    out.push_str("m start/stop monitoring · q quit\n");
    out
}

fn render_header(frame: &Frame<'_>) -> String {
    let monitoring = if frame.status.status().is_monitoring {
        "● MONITORING"
    } else {
        "○ IDLE"
    };
    let mode = if frame.mock_mode { " (mock backend)" } else { "" };
    let mut line = format!(
        "WBIDS Dashboard{mode}  |  {monitoring}  |  active alerts: {}",
        frame.active_alerts
    );
    if let Some(at) = frame.status.updated_at() {
        line.push_str(&format!("  |  updated {}", format_clock(at)));
    }
    if let Some(err) = frame.status.last_error() {
        line.push_str(&format!("\n  backend unreachable: {err}"));
    }
    line.push('\n');
    line
}

pub fn render_status(status: &SystemStatus, source: DataSource) -> String {
    let mut out = format!("System status ({})\n", source.as_str());
    out.push_str(&format!(
        "  Monitoring        {}\n",
        if status.is_monitoring { "active" } else { "stopped" }
    ));
    out.push_str(&format!(
        "  Packets captured  {}\n",
        format_count(status.packets_captured)
    ));
    out.push_str(&format!(
        "  Threat alerts     {}\n",
        format_count(status.threat_alerts)
    ));
    out.push_str(&format!(
        "  Suspicious IPs    {}\n",
        format_count(status.suspicious_ips)
    ));
    out.push_str(&format!(
        "  Uptime            {}\n",
        format_uptime(status.uptime_secs)
    ));
    out
}

pub fn render_alerts(book: &AlertBook, source: DataSource, color: bool) -> String {
    let mut out = format!(
        "Alerts ({}) {} active, {} resolved\n",
        source.as_str(),
        book.active_count(),
        book.resolved_count()
    );
    if book.all().is_empty() {
        out.push_str("  no alerts\n");
        return out;
    }
    for (i, alert) in book.all().iter().enumerate() {
        let mark = if book.is_resolved(&alert.id()) { "✓" } else { " " };
        out.push_str(&format!(
            "  {mark} {:>2}. {} {:<10} {:<16} {:<15} {:>4}  {}\n",
            i + 1,
            format_alert_time(alert),
            severity_badge(alert.severity, color),
            alert.threat_type,
            alert.source_ip,
            format_confidence(alert.confidence),
            alert.description
        ));
    }
    out
}

pub fn render_analytics(book: &AlertBook, color: bool) -> String {
    let mut out = String::from("Threat analytics\n  ");
    let breakdown: Vec<String> = book
        .severity_breakdown()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(severity, count)| format!("{} {count}", severity_badge(severity, color)))
        .collect();
    if breakdown.is_empty() {
        out.push_str("no active threats\n");
        return out;
    }
    out.push_str(&breakdown.join("  "));
    out.push('\n');
    for (threat_type, count) in book.threat_type_counts() {
        out.push_str(&format!("  {threat_type:<16} {count}\n"));
    }
    out
}

pub fn render_devices(devices: &[Device]) -> String {
    let mut out = format!("Nearby access points ({})\n", devices.len());
    for device in devices {
        let flag = if device.is_suspect { "  ⚠ possible evil twin" } else { "" };
        out.push_str(&format!(
            "  {} {:<18} {:<9} ch{:<3} {:>4} dBm ({:<9}) {:>2} clients{flag}\n",
            device.bssid,
            device.ssid,
            device.vendor,
            device.channel,
            device.rssi_dbm,
            rssi_quality(device.rssi_dbm),
            device.clients
        ));
    }
    out
}

pub fn render_signal(signal: &SignalView) -> String {
    match signal.latest().and_then(|s| s.peak()) {
        Some(peak) => format!(
            "Signal strength  {}  peak {peak} dBm\n",
            sparkline(&signal.peaks())
        ),
        None => "Signal strength  collecting…\n".to_string(),
    }
}

pub fn render_notifications(notifications: &[Notification]) -> String {
    let mut out = String::from("Notifications\n");
    for note in notifications {
        out.push_str(&format!(
            "  {} {:<8} {}: {}\n",
            format_clock(note.at),
            note.level.as_str(),
            note.title,
            note.body
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::ResolvePolicy;
    use crate::error::{DashboardError, Endpoint};
    use crate::models::domain::{Severity, ThreatAlert};
    use crate::notify;
    use crate::views::FallbackPolicy;

    fn alert(timestamp: f64, ip: &str, severity: Severity, threat_type: &str) -> ThreatAlert {
        ThreatAlert {
            timestamp,
            threat_type: threat_type.to_string(),
            severity,
            source_ip: ip.to_string(),
            description: format!("{threat_type} from {ip}"),
            confidence: 0.8,
        }
    }

    #[test]
    fn test_status_block_shows_uptime_and_counts() {
        let status = SystemStatus {
            is_monitoring: true,
            packets_captured: 12_345,
            threat_alerts: 4,
            suspicious_ips: 2,
            uptime_secs: 15780.0,
        };
        let text = render_status(&status, DataSource::Live);
        assert!(text.contains("(live)"));
        assert!(text.contains("12,345"));
        assert!(text.contains("4h 23m"));
        assert!(text.contains("active"));
    }

    #[test]
    fn test_alerts_block_marks_resolved() {
        let mut book = AlertBook::new(ResolvePolicy::Monotonic);
        let first = alert(100.0, "10.0.0.1", Severity::High, "PORT_SCAN");
        book.ingest(vec![first.clone(), alert(200.0, "10.0.0.2", Severity::Low, "ANOMALY")]);
        book.resolve(&first.id());

        let text = render_alerts(&book, DataSource::Live, false);
        assert!(text.contains("1 active, 1 resolved"));
        assert!(text.contains("✓  1."));
        assert!(text.contains("[HIGH]"));
        assert!(text.contains("80%"));
    }

    #[test]
    fn test_analytics_lists_active_severities() {
        let mut book = AlertBook::default();
        book.ingest(vec![
            alert(1.0, "10.0.0.1", Severity::Critical, "DDOS"),
            alert(2.0, "10.0.0.2", Severity::Critical, "EVIL_TWIN"),
        ]);
        let text = render_analytics(&book, false);
        assert!(text.contains("[CRITICAL] 2"));
        assert!(text.contains("DDOS"));
        assert!(!text.contains("[LOW]"));

        let empty = render_analytics(&AlertBook::default(), false);
        assert!(empty.contains("no active threats"));
    }

    #[test]
    fn test_frame_with_unreachable_backend() {
        let (notifier, _feed) = notify::channel();
        let mut status = StatusView::default();
        status.apply(
            Err(DashboardError::request_failed(Endpoint::Status, "connection refused")),
            FallbackPolicy::DisplayDefault,
        );
        let mut alerts = AlertsView::new(ResolvePolicy::Monotonic, notifier);
        alerts.apply(
            Err(DashboardError::request_failed(Endpoint::Alerts, "connection refused")),
            FallbackPolicy::DisplayDefault,
        );
        let devices = DevicesView::default();
        let signal = SignalView::new(5);

        let text = render_frame(&Frame {
            status: &status,
            alerts: &alerts,
            devices: &devices,
            signal: &signal,
            active_alerts: alerts.book().active_count(),
            notifications: &[],
            mock_mode: false,
            color: false,
        });
        assert!(text.contains("backend unreachable"));
        assert!(text.contains("System status (fallback)"));
        assert!(text.contains("0h 0m"));
        assert!(text.contains("active alerts: 3"));
        assert!(text.contains("collecting"));
        assert!(!text.contains("t <n> toggle"));
    }

    #[test]
    fn test_devices_flag_evil_twin() {
        let devices = vec![Device {
            bssid: "AA:BB:CC:DD:EE:FF".into(),
            ssid: "HomeNet-5G".into(),
            vendor: "Unknown".into(),
            rssi_dbm: -45,
            channel: 6,
            clients: 0,
            is_suspect: true,
        }];
        let text = render_devices(&devices);
        assert!(text.contains("possible evil twin"));
        assert!(text.contains("excellent"));
    }
}
