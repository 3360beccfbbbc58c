//! Error type shared by the API client, views and control.
//!
//! Transport failures, non-success HTTP statuses and undecodable bodies all
//! collapse into [`DashboardError::RequestFailed`]; callers only need to know
//! which endpoint failed.

use std::fmt;

/// Backend endpoints the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Status,
    Alerts,
    StartMonitoring,
    StopMonitoring,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Status => "/api/status",
            Endpoint::Alerts => "/api/alerts",
            Endpoint::StartMonitoring => "/api/start_monitoring",
            Endpoint::StopMonitoring => "/api/stop_monitoring",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Any failed round trip to the backend.
    #[error("request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: Endpoint, reason: String },

    /// Invalid URL, interval or other startup configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn request_failed(endpoint: Endpoint, reason: impl fmt::Display) -> Self {
        DashboardError::RequestFailed {
            endpoint,
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::RequestFailed { .. } => "RequestFailed",
            DashboardError::Config(_) => "Config",
        }
    }

    /// The endpoint a request failure belongs to, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            DashboardError::RequestFailed { endpoint, .. } => Some(*endpoint),
            DashboardError::Config(_) => None,
        }
    }
}
