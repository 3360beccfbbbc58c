//! Start/stop monitoring on user request.
//!
//! The local flag only changes after the backend acknowledged the request,
//! or when a status poll that began after the latest acknowledgement reports
//! the backend's state. Failures are reported through the notifier and leave
//! the flag untouched.

use std::sync::{Arc, Mutex};

use crate::api::Backend;
use crate::error::DashboardError;
use crate::models::domain::MonitoringAck;
use crate::notify::{Level, Notifier};
use crate::views::{lock, SignalView};

#[derive(Debug, Default)]
struct FlagState {
    on: bool,
    generation: u64,
}

/// Local monitoring flag shared by the control and the status poller.
///
/// Every acknowledgement bumps a generation. A status result only updates
/// the flag if no acknowledgement arrived since its fetch began.
#[derive(Debug, Default)]
pub struct MonitoringState {
    inner: Mutex<FlagState>,
}

impl MonitoringState {
    pub fn is_on(&self) -> bool {
        lock(&self.inner).on
    }

    /// Generation to capture when a status fetch starts.
    pub fn generation(&self) -> u64 {
        lock(&self.inner).generation
    }

    /// Record a status observation from a fetch begun at `started`.
    /// Returns `false` when the observation is stale and was dropped.
    pub fn observe(&self, started: u64, on: bool) -> bool {
        let mut state = lock(&self.inner);
        if state.generation != started {
            tracing::debug!(started, current = state.generation, "dropping stale monitoring state");
            return false;
        }
        state.on = on;
        true
    }

    /// Apply an acknowledged state and return the previous one.
    fn acknowledge(&self, on: bool) -> bool {
        let mut state = lock(&self.inner);
        state.generation += 1;
        std::mem::replace(&mut state.on, on)
    }
}

pub struct MonitorControl<B> {
    backend: Arc<B>,
    monitoring: Arc<MonitoringState>,
    signal: Arc<Mutex<SignalView>>,
    notifier: Notifier,
}

impl<B: Backend> MonitorControl<B> {
    pub fn new(backend: Arc<B>, signal: Arc<Mutex<SignalView>>, notifier: Notifier) -> Self {
        Self {
            backend,
            monitoring: Arc::new(MonitoringState::default()),
            signal,
            notifier,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.is_on()
    }

    /// Shared flag, also fed by the status poller to follow the backend.
    pub fn monitoring_state(&self) -> Arc<MonitoringState> {
        self.monitoring.clone()
    }

    /// Start when stopped, stop when running. Returns the new state.
    pub async fn toggle(&self) -> Result<bool, DashboardError> {
        let ack = if self.is_monitoring() {
            self.stop().await?
        } else {
            self.start().await?
        };
        Ok(ack.is_monitoring)
    }

    pub async fn start(&self) -> Result<MonitoringAck, DashboardError> {
        match self.backend.start_monitoring().await {
            Ok(ack) => {
                let was_monitoring = self.monitoring.acknowledge(ack.is_monitoring);
                if ack.is_monitoring && !was_monitoring {
                    lock(&self.signal).clear();
                }
                self.notifier.notify(Level::Info, "Monitoring", ack.status.clone());
                Ok(ack)
            }
            Err(e) => {
                self.notifier
                    .notify(Level::Error, "Failed to start monitoring", e.to_string());
                Err(e)
            }
        }
    }

    pub async fn stop(&self) -> Result<MonitoringAck, DashboardError> {
        match self.backend.stop_monitoring().await {
            Ok(ack) => {
                self.monitoring.acknowledge(ack.is_monitoring);
                self.notifier.notify(Level::Info, "Monitoring", ack.status.clone());
                Ok(ack)
            }
            Err(e) => {
                self.notifier
                    .notify(Level::Error, "Failed to stop monitoring", e.to_string());
                Err(e)
            }
        }
    }
}
