#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use wbids::config::parse_api_url;
use wbids::models::domain::{MonitoringAck, Severity, SystemStatus, ThreatAlert};
use wbids::{ApiClient, Backend, DashboardError, Endpoint};

/// Serve `router` on an ephemeral loopback port and return a client for it.
pub fn serve(router: Router) -> (ApiClient, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    let server = axum::Server::from_tcp(listener)
        .expect("adopt listener")
        .serve(router.into_make_service());
    tokio::spawn(async move {
        let _ = server.await;
    });
    let url = parse_api_url(&format!("http://{addr}")).expect("valid url");
    (ApiClient::new(url), addr)
}

pub fn alert(timestamp: f64, ip: &str, severity: Severity) -> ThreatAlert {
    ThreatAlert {
        timestamp,
        threat_type: "PORT_SCAN".to_string(),
        severity,
        source_ip: ip.to_string(),
        description: format!("Port scan detected from {ip}"),
        confidence: 0.8,
    }
}

/// Scriptable backend that counts calls and can be switched offline.
#[derive(Default)]
pub struct FakeBackend {
    pub offline: AtomicBool,
    /// `start_monitoring` never answers.
    pub hang_start: AtomicBool,
    /// Status is snapshotted when the request arrives and returned after this delay.
    pub status_delay: Mutex<Duration>,
    pub status_calls: AtomicUsize,
    pub alerts_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub status: Mutex<SystemStatus>,
    pub alerts: Mutex<Vec<ThreatAlert>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_alerts(&self, alerts: Vec<ThreatAlert>) {
        *self.alerts.lock().unwrap() = alerts;
    }

    fn check(&self, endpoint: Endpoint) -> Result<(), DashboardError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(DashboardError::request_failed(endpoint, "connection refused"))
        } else {
            Ok(())
        }
    }
}

impl Backend for FakeBackend {
    async fn get_status(&self) -> Result<SystemStatus, DashboardError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Endpoint::Status)?;
        let snapshot = self.status.lock().unwrap().clone();
        let delay = *self.status_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(snapshot)
    }

    async fn get_alerts(&self) -> Result<Vec<ThreatAlert>, DashboardError> {
        self.alerts_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Endpoint::Alerts)?;
        Ok(self.alerts.lock().unwrap().clone())
    }

    async fn start_monitoring(&self) -> Result<MonitoringAck, DashboardError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_start.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.check(Endpoint::StartMonitoring)?;
        self.status.lock().unwrap().is_monitoring = true;
        Ok(MonitoringAck {
            status: "Monitoring started".to_string(),
            is_monitoring: true,
        })
    }

    async fn stop_monitoring(&self) -> Result<MonitoringAck, DashboardError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Endpoint::StopMonitoring)?;
        self.status.lock().unwrap().is_monitoring = false;
        Ok(MonitoringAck {
            status: "Monitoring stopped".to_string(),
            is_monitoring: false,
        })
    }
}
