//! Per-view state fed by the pollers.
//!
//! Every fetch reaches a view as a `Result`. What a failure turns into is the
//! caller's [`FallbackPolicy`], not something each view decides on its own.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};

use crate::alerts::{AlertBook, ResolvePolicy};
use crate::error::DashboardError;
use crate::mock::placeholder_alerts;
use crate::models::domain::{AlertId, Device, SignalSample, SystemStatus, ThreatAlert};
use crate::notify::Notifier;

/// Lock a view, recovering the data if a previous holder panicked.
pub fn lock<T>(view: &Mutex<T>) -> MutexGuard<'_, T> {
    view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Show zeroed status and the placeholder alerts.
    #[default]
    DisplayDefault,
    /// Keep whatever was shown before the failure.
    LastKnown,
}

/// Where the data currently on screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// Nothing applied yet.
    #[default]
    Pending,
    Live,
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Pending => "pending",
            DataSource::Live => "live",
            DataSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Default)]
pub struct StatusView {
    status: SystemStatus,
    source: DataSource,
    last_error: Option<String>,
    updated_at: Option<DateTime<Local>>,
}

impl StatusView {
    pub fn apply(&mut self, outcome: Result<SystemStatus, DashboardError>, policy: FallbackPolicy) {
        match outcome {
            Ok(status) => {
                log_poll_success("status", self.last_error.as_deref());
                self.status = status;
                self.source = DataSource::Live;
                self.last_error = None;
            }
            Err(e) => {
                log_poll_failure("status", self.last_error.as_deref(), &e);
                if policy == FallbackPolicy::DisplayDefault {
                    self.status = SystemStatus::default();
                }
                self.source = DataSource::Fallback;
                self.last_error = Some(e.to_string());
            }
        }
        self.updated_at = Some(Local::now());
    }

    pub fn status(&self) -> &SystemStatus {
        &self.status
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }
}

/// Warn on the first failure of a streak; repeats only reach `debug` so a
/// dead backend does not flood stderr under the live frame.
fn log_poll_failure(view: &str, previous: Option<&str>, err: &DashboardError) {
    if previous.is_none() {
        tracing::warn!("{view} poll failed, showing fallback: {err}");
    } else {
        tracing::debug!("{view} poll still failing: {err}");
    }
}

fn log_poll_success(view: &str, previous: Option<&str>) {
    if previous.is_some() {
        tracing::info!("{view} poll recovered");
    }
}

type CountListener = Box<dyn Fn(usize) + Send>;

pub struct AlertsView {
    book: AlertBook,
    source: DataSource,
    last_error: Option<String>,
    notifier: Notifier,
    on_count: Option<CountListener>,
}

impl AlertsView {
    pub fn new(policy: ResolvePolicy, notifier: Notifier) -> Self {
        Self {
            book: AlertBook::new(policy),
            source: DataSource::Pending,
            last_error: None,
            notifier,
            on_count: None,
        }
    }

    /// Called with the active count after every change.
    pub fn set_count_listener(&mut self, listener: impl Fn(usize) + Send + 'static) {
        self.on_count = Some(Box::new(listener));
        self.publish_count();
    }

    pub fn apply(
        &mut self,
        outcome: Result<Vec<ThreatAlert>, DashboardError>,
        policy: FallbackPolicy,
    ) {
        match outcome {
            Ok(alerts) => {
                tracing::debug!(fetched = alerts.len(), "alerts poll");
                log_poll_success("alerts", self.last_error.as_deref());
                for alert in self.book.ingest(alerts) {
                    self.notifier.critical_alert(&alert);
                }
                self.source = DataSource::Live;
                self.last_error = None;
            }
            Err(e) => {
                log_poll_failure("alerts", self.last_error.as_deref(), &e);
                if policy == FallbackPolicy::DisplayDefault {
                    self.book.replace_silently(placeholder_alerts());
                }
                self.source = DataSource::Fallback;
                self.last_error = Some(e.to_string());
            }
        }
        self.publish_count();
    }

    /// Resolve the alert at a 1-based display position.
    pub fn resolve_nth(&mut self, position: usize) -> Option<AlertId> {
        let id = self.book.nth(position)?.id();
        self.book.resolve(&id);
        self.publish_count();
        Some(id)
    }

    /// Toggle the alert at a 1-based display position; returns the new state.
    pub fn toggle_nth(&mut self, position: usize) -> Option<(AlertId, bool)> {
        let id = self.book.nth(position)?.id();
        let resolved = self.book.toggle(&id);
        self.publish_count();
        Some((id, resolved))
    }

    pub fn book(&self) -> &AlertBook {
        &self.book
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn publish_count(&self) {
        if let Some(listener) = &self.on_count {
            listener(self.book.active_count());
        }
    }
}

/// Bounded history of signal samples for the chart.
#[derive(Debug)]
pub struct SignalView {
    samples: VecDeque<SignalSample>,
    capacity: usize,
}

impl SignalView {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, sample: SignalSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&SignalSample> {
        self.samples.back()
    }

    /// Strongest reading of each sample, oldest first.
    pub fn peaks(&self) -> Vec<i32> {
        self.samples.iter().filter_map(SignalSample::peak).collect()
    }
}

#[derive(Debug, Default)]
pub struct DevicesView {
    devices: Vec<Device>,
}

impl DevicesView {
    pub fn replace(&mut self, devices: Vec<Device>) {
        self.devices = devices;
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Vec<Device> {
        &mut self.devices
    }

    pub fn suspect_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_suspect).count()
    }
}

/// Header counters bubbled up from the views.
#[derive(Debug, Clone, Default)]
pub struct Header {
    active_alerts: Arc<AtomicUsize>,
}

impl Header {
    pub fn active_alerts(&self) -> usize {
        self.active_alerts.load(Ordering::Relaxed)
    }

    /// Listener for [`AlertsView::set_count_listener`].
    pub fn alert_count_listener(&self) -> impl Fn(usize) + Send + 'static {
        let counter = self.active_alerts.clone();
        move |count| counter.store(count, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Endpoint;
    use crate::models::domain::Severity;
    use crate::notify::{self, Level};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl Captured {
        fn count(&self, needle: &str) -> usize {
            String::from_utf8_lossy(&self.0.lock().unwrap()).matches(needle).count()
        }
    }

    fn failure(endpoint: Endpoint) -> DashboardError {
        DashboardError::request_failed(endpoint, "connection refused")
    }

    fn alert(timestamp: f64, ip: &str, severity: Severity) -> ThreatAlert {
        ThreatAlert {
            timestamp,
            threat_type: "DDOS".to_string(),
            severity,
            source_ip: ip.to_string(),
            description: format!("Potential DDoS attack from {ip}"),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_status_failure_yields_zeroed_fields() {
        let mut view = StatusView::default();
        view.apply(Err(failure(Endpoint::Status)), FallbackPolicy::DisplayDefault);
        let status = view.status();
        assert!(!status.is_monitoring);
        assert_eq!(status.packets_captured, 0);
        assert_eq!(status.threat_alerts, 0);
        assert_eq!(status.suspicious_ips, 0);
        assert_eq!(status.uptime_secs, 0.0);
        assert_eq!(view.source(), DataSource::Fallback);
        assert!(view.last_error().unwrap().contains("/api/status"));
    }

    #[test]
    fn test_status_last_known_policy_keeps_previous() {
        let mut view = StatusView::default();
        let live = SystemStatus {
            is_monitoring: true,
            packets_captured: 900,
            threat_alerts: 2,
            suspicious_ips: 1,
            uptime_secs: 60.0,
        };
        view.apply(Ok(live.clone()), FallbackPolicy::LastKnown);
        view.apply(Err(failure(Endpoint::Status)), FallbackPolicy::LastKnown);
        assert_eq!(view.status(), &live);
        assert_eq!(view.source(), DataSource::Fallback);

        view.apply(Err(failure(Endpoint::Status)), FallbackPolicy::DisplayDefault);
        assert_eq!(view.status(), &SystemStatus::default());
    }

    #[test]
    fn test_status_success_clears_error() {
        let mut view = StatusView::default();
        view.apply(Err(failure(Endpoint::Status)), FallbackPolicy::DisplayDefault);
        view.apply(Ok(SystemStatus::default()), FallbackPolicy::DisplayDefault);
        assert_eq!(view.source(), DataSource::Live);
        assert!(view.last_error().is_none());
        assert!(view.updated_at().is_some());
    }

    #[test]
    fn test_alerts_failure_shows_placeholders_without_notifying() {
        let (notifier, feed) = notify::channel();
        let mut view = AlertsView::new(ResolvePolicy::Monotonic, notifier);
        view.apply(Err(failure(Endpoint::Alerts)), FallbackPolicy::DisplayDefault);
        assert_eq!(view.book().all(), placeholder_alerts().as_slice());
        assert_eq!(view.source(), DataSource::Fallback);
        assert!(feed.drain().is_empty());
    }

    #[test]
    fn test_alerts_last_known_policy_keeps_previous() {
        let (notifier, _feed) = notify::channel();
        let mut view = AlertsView::new(ResolvePolicy::Monotonic, notifier);
        let live = vec![alert(10.0, "10.0.0.1", Severity::High)];
        view.apply(Ok(live.clone()), FallbackPolicy::LastKnown);
        view.apply(Err(failure(Endpoint::Alerts)), FallbackPolicy::LastKnown);
        assert_eq!(view.book().all(), live.as_slice());
    }

    #[test]
    fn test_critical_alert_notifies_once_and_count_bubbles() {
        let (notifier, feed) = notify::channel();
        let header = Header::default();
        let mut view = AlertsView::new(ResolvePolicy::Monotonic, notifier);
        view.set_count_listener(header.alert_count_listener());

        let fetch = vec![
            alert(10.0, "10.0.0.1", Severity::Critical),
            alert(11.0, "10.0.0.2", Severity::Low),
        ];
        view.apply(Ok(fetch.clone()), FallbackPolicy::DisplayDefault);
        view.apply(Ok(fetch), FallbackPolicy::DisplayDefault);

        let notes = feed.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, Level::Critical);
        assert_eq!(header.active_alerts(), 2);

        assert!(view.resolve_nth(1).is_some());
        assert_eq!(header.active_alerts(), 1);
        assert!(view.resolve_nth(7).is_none());
    }

    #[test]
    fn test_toggle_nth_round_trip_in_toggle_mode() {
        let (notifier, _feed) = notify::channel();
        let header = Header::default();
        let mut view = AlertsView::new(ResolvePolicy::Toggle, notifier);
        view.set_count_listener(header.alert_count_listener());
        view.apply(
            Ok(vec![alert(10.0, "10.0.0.1", Severity::Medium)]),
            FallbackPolicy::DisplayDefault,
        );

        let (_, resolved) = view.toggle_nth(1).unwrap();
        assert!(resolved);
        assert_eq!(header.active_alerts(), 0);
        let (_, resolved) = view.toggle_nth(1).unwrap();
        assert!(!resolved);
        assert_eq!(header.active_alerts(), 1);
    }

    #[test]
    fn test_signal_view_is_bounded_and_clearable() {
        let mut view = SignalView::new(3);
        for rssi in [-70, -65, -60, -55] {
            view.push(SignalSample {
                at: Local::now(),
                readings: vec![("HomeNet-5G".into(), rssi)],
            });
        }
        assert_eq!(view.len(), 3);
        assert_eq!(view.peaks(), vec![-65, -60, -55]);
        assert_eq!(view.latest().and_then(SignalSample::peak), Some(-55));

        view.clear();
        assert!(view.is_empty());
    }

    #[test]
    fn test_devices_view_counts_suspects() {
        let mut view = DevicesView::default();
        let mut data = crate::mock::MockData::seeded(11);
        let devices = data.devices();
        let expected = devices.iter().filter(|d| d.is_suspect).count();
        view.replace(devices);
        assert_eq!(view.suspect_count(), expected);
    }

    #[test]
    fn test_repeated_poll_failures_warn_once_per_streak() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let (notifier, _feed) = notify::channel();
            let mut status = StatusView::default();
            let mut alerts = AlertsView::new(ResolvePolicy::Monotonic, notifier);
            for _ in 0..4 {
                status.apply(Err(failure(Endpoint::Status)), FallbackPolicy::DisplayDefault);
                alerts.apply(Err(failure(Endpoint::Alerts)), FallbackPolicy::DisplayDefault);
            }
            assert_eq!(captured.count("status poll failed"), 1);
            assert_eq!(captured.count("alerts poll failed"), 1);

            status.apply(Ok(SystemStatus::default()), FallbackPolicy::DisplayDefault);
            status.apply(Err(failure(Endpoint::Status)), FallbackPolicy::DisplayDefault);
            assert_eq!(captured.count("status poll failed"), 2);
        });
    }
}
