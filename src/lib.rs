pub mod alerts;
pub mod api;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod format;
pub mod logging;
pub mod mock;
pub mod mock_server;
pub mod models;
pub mod notify;
pub mod render;
pub mod scheduler;
pub mod views;

pub use api::{ApiClient, Backend};
pub use error::{DashboardError, Endpoint};
pub use models::domain::{AlertId, MonitoringAck, Severity, SystemStatus, ThreatAlert};
