//! User-facing notifications.
//!
//! Producers (pollers, the monitoring control) hold a cloneable [`Notifier`];
//! the render loop drains the matching [`NotificationFeed`] once per frame.

use chrono::{DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::models::domain::ThreatAlert;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Critical,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Critical => "CRITICAL",
            Level::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub body: String,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

pub struct NotificationFeed {
    rx: Receiver<Notification>,
}

pub fn channel() -> (Notifier, NotificationFeed) {
    let (tx, rx) = unbounded();
    (Notifier { tx }, NotificationFeed { rx })
}

impl Notifier {
    pub fn notify(&self, level: Level, title: impl Into<String>, body: impl Into<String>) {
        let notification = Notification {
            level,
            title: title.into(),
            body: body.into(),
            at: Local::now(),
        };
        match level {
            Level::Info => tracing::info!(title = %notification.title, "{}", notification.body),
            Level::Warning => tracing::warn!(title = %notification.title, "{}", notification.body),
            Level::Critical | Level::Error => {
                tracing::error!(title = %notification.title, "{}", notification.body)
            }
        }
        // The feed is gone once the dashboard shuts down; nothing left to show.
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification feed closed");
        }
    }

    pub fn critical_alert(&self, alert: &ThreatAlert) {
        self.notify(
            Level::Critical,
            format!("Critical threat: {}", alert.threat_type),
            format!("{} ({})", alert.description, alert.source_ip),
        );
    }
}

impl NotificationFeed {
    /// Everything delivered since the last drain, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.rx.try_iter().collect()
    }
}
