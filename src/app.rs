//! Dashboard runtime: views, pollers, input and the render loop.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::alerts::ResolvePolicy;
use crate::api::Backend;
use crate::config::{PollIntervals, RECENT_NOTIFICATIONS, RENDER_INTERVAL_MS, SIGNAL_HISTORY_LEN};
use crate::control::MonitorControl;
use crate::error::DashboardError;
use crate::mock::MockData;
use crate::models::domain::SystemStatus;
use crate::notify::{self, Level, Notification, NotificationFeed, Notifier};
use crate::render::{self, Frame, CLEAR};
use crate::scheduler::Scheduler;
use crate::views::{
    lock, AlertsView, DevicesView, FallbackPolicy, Header, SignalView, StatusView,
};

pub const STATUS_TASK: &str = "status";
pub const ALERTS_TASK: &str = "alerts";
pub const SIGNAL_TASK: &str = "signal";

#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub intervals: PollIntervals,
    pub fallback: FallbackPolicy,
    /// Running against the in-process mock backend.
    pub mock_mode: bool,
    pub color: bool,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve(usize),
    Toggle(usize),
    ToggleMonitoring,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?;
        let position = parts.next().and_then(|n| n.parse::<usize>().ok());
        match verb {
            "r" | "resolve" => position.map(Command::Resolve),
            "t" | "toggle" => position.map(Command::Toggle),
            "m" | "monitor" => Some(Command::ToggleMonitoring),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub struct Dashboard<B: Backend> {
    backend: Arc<B>,
    options: DashboardOptions,
    status: Arc<Mutex<StatusView>>,
    alerts: Arc<Mutex<AlertsView>>,
    signal: Arc<Mutex<SignalView>>,
    devices: Arc<Mutex<DevicesView>>,
    header: Header,
    control: MonitorControl<B>,
    notifier: Notifier,
    feed: NotificationFeed,
    recent: VecDeque<Notification>,
    scheduler: Scheduler,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: Arc<B>, options: DashboardOptions, shutdown: &CancellationToken) -> Self {
        let (notifier, feed) = notify::channel();
        let header = Header::default();
        let policy = if options.mock_mode {
            ResolvePolicy::Toggle
        } else {
            ResolvePolicy::Monotonic
        };

        let mut alerts = AlertsView::new(policy, notifier.clone());
        alerts.set_count_listener(header.alert_count_listener());

        let signal = Arc::new(Mutex::new(SignalView::new(SIGNAL_HISTORY_LEN)));
        let control = MonitorControl::new(backend.clone(), signal.clone(), notifier.clone());

        Self {
            backend,
            options,
            status: Arc::new(Mutex::new(StatusView::default())),
            alerts: Arc::new(Mutex::new(alerts)),
            signal,
            devices: Arc::new(Mutex::new(DevicesView::default())),
            header,
            control,
            notifier,
            feed,
            recent: VecDeque::with_capacity(RECENT_NOTIFICATIONS),
            scheduler: Scheduler::with_parent(shutdown),
        }
    }

    /// Register the status, alerts and signal pollers.
    pub fn start_pollers(&mut self) {
        let policy = self.options.fallback;

        let backend = self.backend.clone();
        let view = self.status.clone();
        let monitoring = self.control.monitoring_state();
        let observed = monitoring.clone();
        self.scheduler.spawn_poller(
            STATUS_TASK,
            self.options.intervals.status,
            move || {
                let backend = backend.clone();
                let started = monitoring.generation();
                async move { (started, backend.get_status().await) }
            },
            move |(started, outcome): (u64, Result<SystemStatus, DashboardError>)| {
                if let Ok(status) = &outcome {
                    observed.observe(started, status.is_monitoring);
                }
                lock(&view).apply(outcome, policy);
            },
        );

        let backend = self.backend.clone();
        let view = self.alerts.clone();
        self.scheduler.spawn_poller(
            ALERTS_TASK,
            self.options.intervals.alerts,
            move || {
                let backend = backend.clone();
                async move { backend.get_alerts().await }
            },
            move |outcome| lock(&view).apply(outcome, policy),
        );

        // The backend has no radio endpoint, so the signal chart and device
        // list are always simulated.
        let mut data = MockData::new();
        lock(&self.devices).replace(data.devices());
        let devices = self.devices.clone();
        let signal = self.signal.clone();
        let monitoring = self.control.monitoring_state();
        self.scheduler.spawn_poller(
            SIGNAL_TASK,
            self.options.intervals.signal,
            || async {},
            move |()| {
                let mut devices = lock(&devices);
                data.drift(devices.devices_mut());
                if monitoring.is_on() {
                    lock(&signal).push(data.signal_sample(devices.devices()));
                }
            },
        );

        tracing::info!(tasks = ?self.scheduler.task_names(), "pollers started");
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn active_alerts(&self) -> usize {
        self.header.active_alerts()
    }

    pub fn is_monitoring(&self) -> bool {
        self.control.is_monitoring()
    }

    pub fn status(&self) -> Arc<Mutex<StatusView>> {
        self.status.clone()
    }

    pub fn alerts(&self) -> Arc<Mutex<AlertsView>> {
        self.alerts.clone()
    }

    /// Apply one command. Returns `false` when the user asked to quit.
    pub async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Resolve(position) => {
                let resolved = lock(&self.alerts).resolve_nth(position);
                match resolved {
                    Some(id) => self.notifier.notify(Level::Info, "Alert resolved", id.to_string()),
                    None => self.notifier.notify(
                        Level::Warning,
                        "No such alert",
                        format!("alert #{position} is not listed"),
                    ),
                }
            }
            Command::Toggle(position) => {
                if !self.options.mock_mode {
                    self.notifier.notify(
                        Level::Warning,
                        "Toggle unavailable",
                        "backend alerts can only be resolved",
                    );
                    return true;
                }
                let toggled = lock(&self.alerts).toggle_nth(position);
                match toggled {
                    Some((id, true)) => {
                        self.notifier.notify(Level::Info, "Alert resolved", id.to_string())
                    }
                    Some((id, false)) => {
                        self.notifier.notify(Level::Info, "Alert reopened", id.to_string())
                    }
                    None => self.notifier.notify(
                        Level::Warning,
                        "No such alert",
                        format!("alert #{position} is not listed"),
                    ),
                }
            }
            Command::ToggleMonitoring => {
                if let Err(e) = self.control.toggle().await {
                    tracing::debug!("monitoring toggle failed: {e}");
                }
            }
            Command::Quit => return false,
        }
        true
    }

    /// Drain pending notifications and render the current frame.
    pub fn frame_text(&mut self) -> String {
        for note in self.feed.drain() {
            if self.recent.len() == RECENT_NOTIFICATIONS {
                self.recent.pop_front();
            }
            self.recent.push_back(note);
        }
        let notifications: Vec<Notification> = self.recent.iter().cloned().collect();

        let status = lock(&self.status);
        let alerts = lock(&self.alerts);
        let devices = lock(&self.devices);
        let signal = lock(&self.signal);
        render::render_frame(&Frame {
            status: &status,
            alerts: &alerts,
            devices: &devices,
            signal: &signal,
            active_alerts: self.header.active_alerts(),
            notifications: &notifications,
            mock_mode: self.options.mock_mode,
            color: self.options.color,
        })
    }

    /// Render until the user quits or `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        self.run_with_input(spawn_input_reader(), shutdown).await
    }

    /// Same as [`Dashboard::run`], reading command lines from `input`.
    pub async fn run_with_input(
        mut self,
        mut input: mpsc::UnboundedReceiver<String>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()> {
        self.start_pollers();
        let mut input_open = true;
        let mut ticker = time::interval(Duration::from_millis(RENDER_INTERVAL_MS));

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.draw()?,
                line = input.recv(), if input_open => match line {
                    Some(line) => {
                        let Some(command) = Command::parse(&line) else {
                            continue;
                        };
                        // A backend that never answers must not hold off Ctrl-C.
                        let keep = tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => false,
                            keep = self.handle(command) => keep,
                        };
                        if !keep {
                            break;
                        }
                        self.draw()?;
                    }
                    None => input_open = false,
                },
            }
        }

        tracing::info!("shutting down dashboard");
        self.scheduler.shutdown().await;
        Ok(())
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        let frame = self.frame_text();
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{CLEAR}{frame}")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Read stdin on a dedicated thread; a blocked read must not hold up shutdown.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("stdin read failed: {e}");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("cannot read keyboard input: {e}");
    }
    rx
}

/// Single status fetch for the one-shot CLI command.
pub async fn fetch_status_once<B: Backend>(backend: &B, policy: FallbackPolicy) -> StatusView {
    let mut view = StatusView::default();
    view.apply(backend.get_status().await, policy);
    view
}

/// Single alerts fetch for the one-shot CLI command.
pub async fn fetch_alerts_once<B: Backend>(
    backend: &B,
    policy: FallbackPolicy,
    notifier: Notifier,
) -> AlertsView {
    let mut view = AlertsView::new(ResolvePolicy::Monotonic, notifier);
    view.apply(backend.get_alerts().await, policy);
    view
}
