//! Runtime constants and configuration for the dashboard.
//!
//! Defaults live here as constants. Environment variables (optionally loaded
//! from `.env`) override them, and CLI flags override the environment.

use std::time::Duration;

use reqwest::Url;

use crate::error::DashboardError;

/// Backend base URL; the backend binds port 5000 on localhost.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Interval at which the status view polls `/api/status` (seconds).
pub const STATUS_POLL_INTERVAL_SECS: u64 = 2;

/// Interval at which the alerts view polls `/api/alerts` (seconds).
pub const ALERTS_POLL_INTERVAL_SECS: u64 = 5;

/// Interval at which the signal chart and device list refresh (seconds).
pub const SIGNAL_POLL_INTERVAL_SECS: u64 = 3;

/// Interval bounds accepted from the environment or CLI (seconds).
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Interval at which the terminal frame is redrawn (milliseconds).
pub const RENDER_INTERVAL_MS: u64 = 1000;

/// Number of samples kept in the signal history.
pub const SIGNAL_HISTORY_LEN: usize = 30;

/// Number of notifications shown under the frame.
pub const RECENT_NOTIFICATIONS: usize = 5;

/// Port the mock backend server binds by default.
pub const DEFAULT_MOCK_PORT: u16 = 5000;

/// Chance that a status poll on the mock backend produces a new alert while monitoring.
pub const MOCK_ALERT_PROBABILITY: f64 = 0.3;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse_u64(name: &str, default: u64, min: u64, max: u64) -> u64 {
    match env_var(name).and_then(|v| v.parse::<u64>().ok()) {
        Some(v) => v.clamp(min, max),
        None => default,
    }
}

fn env_parse_u16(name: &str, default: u16) -> u16 {
    env_var(name)
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(default)
}

/// Backend base URL.
/// Env: `WBIDS_API_URL`
pub fn api_url() -> String {
    env_var("WBIDS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Env: `WBIDS_STATUS_INTERVAL_SECS`
pub fn status_interval() -> Duration {
    Duration::from_secs(env_parse_u64(
        "WBIDS_STATUS_INTERVAL_SECS",
        STATUS_POLL_INTERVAL_SECS,
        MIN_POLL_INTERVAL_SECS,
        MAX_POLL_INTERVAL_SECS,
    ))
}

/// Env: `WBIDS_ALERTS_INTERVAL_SECS`
pub fn alerts_interval() -> Duration {
    Duration::from_secs(env_parse_u64(
        "WBIDS_ALERTS_INTERVAL_SECS",
        ALERTS_POLL_INTERVAL_SECS,
        MIN_POLL_INTERVAL_SECS,
        MAX_POLL_INTERVAL_SECS,
    ))
}

/// Env: `WBIDS_SIGNAL_INTERVAL_SECS`
pub fn signal_interval() -> Duration {
    Duration::from_secs(env_parse_u64(
        "WBIDS_SIGNAL_INTERVAL_SECS",
        SIGNAL_POLL_INTERVAL_SECS,
        MIN_POLL_INTERVAL_SECS,
        MAX_POLL_INTERVAL_SECS,
    ))
}

/// Env: `WBIDS_MOCK_PORT`
pub fn mock_port() -> u16 {
    env_parse_u16("WBIDS_MOCK_PORT", DEFAULT_MOCK_PORT)
}

/// Parse and validate a backend base URL.
pub fn parse_api_url(raw: &str) -> Result<Url, DashboardError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| DashboardError::Config(format!("invalid backend url {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DashboardError::Config(format!(
            "unsupported url scheme {other:?} in {raw:?}"
        ))),
    }
}

/// Clamp a CLI-supplied interval into the accepted range.
pub fn clamp_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS))
}

/// Poll periods for each live view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub status: Duration,
    pub alerts: Duration,
    pub signal: Duration,
}

impl PollIntervals {
    pub fn from_env() -> Self {
        Self {
            status: status_interval(),
            alerts: alerts_interval(),
            signal: signal_interval(),
        }
    }
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            status: Duration::from_secs(STATUS_POLL_INTERVAL_SECS),
            alerts: Duration::from_secs(ALERTS_POLL_INTERVAL_SECS),
            signal: Duration::from_secs(SIGNAL_POLL_INTERVAL_SECS),
        }
    }
}
