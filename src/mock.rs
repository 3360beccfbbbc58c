//! Mock data for offline operation.
//!
//! Three pieces:
//! - [`MockData`], a seedable random generator for every view's data.
//! - [`placeholder_alerts`], the fixed dataset shown when a fetch fails.
//! - [`MockBackend`], an in-process stand-in for the WBIDS backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use chrono::{Local, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api::Backend;
use crate::config::MOCK_ALERT_PROBABILITY;
use crate::error::DashboardError;
use crate::models::domain::{
    Device, MonitoringAck, Severity, SignalSample, SystemStatus, ThreatAlert,
};

struct ThreatTemplate {
    threat_type: &'static str,
    severity: Severity,
    confidence: f64,
}

const THREATS: &[ThreatTemplate] = &[
    ThreatTemplate { threat_type: "PORT_SCAN", severity: Severity::High, confidence: 0.8 },
    ThreatTemplate { threat_type: "SUSPICIOUS_PORT", severity: Severity::Medium, confidence: 0.6 },
    ThreatTemplate { threat_type: "DDOS", severity: Severity::Critical, confidence: 0.9 },
    ThreatTemplate { threat_type: "ANOMALY", severity: Severity::Medium, confidence: 0.55 },
    ThreatTemplate { threat_type: "EVIL_TWIN", severity: Severity::Critical, confidence: 0.85 },
    ThreatTemplate { threat_type: "DEAUTH_FLOOD", severity: Severity::High, confidence: 0.75 },
];

/// Ports the backend treats as suspicious destinations.
const SUSPICIOUS_PORTS: &[u16] = &[22, 23, 135, 139, 445, 1433, 3389, 5432, 5900, 6379];

const NETWORKS: &[(&str, &str)] = &[
    ("HomeNet-5G", "Netgear"),
    ("CoffeeShop_Guest", "Cisco"),
    ("IoT-Devices", "TP-Link"),
    ("Office-Secure", "Ubiquiti"),
    ("Printer-Direct", "HP"),
];

fn describe(threat_type: &str, source_ip: &str, rng: &mut StdRng) -> String {
    match threat_type {
        "PORT_SCAN" => format!("Port scan detected from {source_ip}"),
        "SUSPICIOUS_PORT" => {
            let port = SUSPICIOUS_PORTS[rng.gen_range(0..SUSPICIOUS_PORTS.len())];
            format!("Connection to suspicious port {port} from {source_ip}")
        }
        "DDOS" => format!("Potential DDoS attack from {source_ip}"),
        "EVIL_TWIN" => format!("Rogue access point impersonating a known SSID near {source_ip}"),
        "DEAUTH_FLOOD" => format!("Deauthentication flood originating from {source_ip}"),
        _ => format!("Anomalous network behavior detected from {source_ip}"),
    }
}

fn epoch_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

pub struct MockData {
    rng: StdRng,
}

impl MockData {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn source_ip(&mut self) -> String {
        format!("192.168.1.{}", self.rng.gen_range(2..=254))
    }

    pub fn alert(&mut self, timestamp: f64) -> ThreatAlert {
        let template = &THREATS[self.rng.gen_range(0..THREATS.len())];
        let source_ip = self.source_ip();
        let spread: f64 = self.rng.gen_range(-0.1..0.1);
        ThreatAlert {
            timestamp,
            threat_type: template.threat_type.to_string(),
            severity: template.severity,
            description: describe(template.threat_type, &source_ip, &mut self.rng),
            source_ip,
            confidence: (template.confidence + spread).clamp(0.0, 1.0),
        }
    }

    /// `count` alerts spread over the last hour, newest first.
    pub fn alerts(&mut self, count: usize) -> Vec<ThreatAlert> {
        let now = epoch_now();
        let mut offsets: Vec<f64> = (0..count)
            .map(|_| self.rng.gen_range(0.0..3600.0))
            .collect();
        offsets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        offsets.into_iter().map(|offset| self.alert(now - offset)).collect()
    }

    pub fn bssid(&mut self) -> String {
        let bytes: [u8; 6] = self.rng.gen();
        bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// One access point per known network plus, sometimes, an evil twin.
    pub fn devices(&mut self) -> Vec<Device> {
        let mut devices: Vec<Device> = NETWORKS
            .iter()
            .map(|(ssid, vendor)| Device {
                bssid: self.bssid(),
                ssid: ssid.to_string(),
                vendor: vendor.to_string(),
                rssi_dbm: self.rng.gen_range(-85..=-35),
                channel: [1u8, 6, 11, 36, 44, 149][self.rng.gen_range(0..6)],
                clients: self.rng.gen_range(0..24),
                is_suspect: false,
            })
            .collect();

        if self.rng.gen_bool(0.5) {
            let (ssid, _) = NETWORKS[self.rng.gen_range(0..NETWORKS.len())];
            devices.push(Device {
                bssid: self.bssid(),
                ssid: ssid.to_string(),
                vendor: "Unknown".to_string(),
                rssi_dbm: self.rng.gen_range(-60..=-30),
                channel: 6,
                clients: self.rng.gen_range(0..3),
                is_suspect: false,
            });
        }

        mark_evil_twins(&mut devices);
        devices
    }

    /// Drift each RSSI by a few dBm, staying within a plausible range.
    pub fn drift(&mut self, devices: &mut [Device]) {
        for device in devices.iter_mut() {
            let delta = self.rng.gen_range(-3..=3);
            device.rssi_dbm = (device.rssi_dbm + delta).clamp(-95, -20);
        }
    }

    pub fn signal_sample(&mut self, devices: &[Device]) -> SignalSample {
        SignalSample {
            at: Local::now(),
            readings: devices
                .iter()
                .map(|d| (d.ssid.clone(), d.rssi_dbm))
                .collect(),
        }
    }
}

impl Default for MockData {
    fn default() -> Self {
        Self::new()
    }
}

/// Flag every device whose SSID is broadcast by more than one BSSID.
pub fn mark_evil_twins(devices: &mut [Device]) {
    let mut bssids_per_ssid: HashMap<String, HashSet<String>> = HashMap::new();
    for device in devices.iter() {
        bssids_per_ssid
            .entry(device.ssid.clone())
            .or_default()
            .insert(device.bssid.clone());
    }
    for device in devices.iter_mut() {
        device.is_suspect = bssids_per_ssid
            .get(&device.ssid)
            .map_or(false, |bssids| bssids.len() > 1);
    }
}

/// Fixed alerts shown in place of a failed alerts fetch.
pub fn placeholder_alerts() -> Vec<ThreatAlert> {
    let base = 1_700_000_000.0;
    vec![
        ThreatAlert {
            timestamp: base + 120.0,
            threat_type: "PORT_SCAN".to_string(),
            severity: Severity::High,
            source_ip: "192.168.1.105".to_string(),
            description: "Port scan detected from 192.168.1.105".to_string(),
            confidence: 0.8,
        },
        ThreatAlert {
            timestamp: base + 60.0,
            threat_type: "SUSPICIOUS_PORT".to_string(),
            severity: Severity::Medium,
            source_ip: "192.168.1.42".to_string(),
            description: "Connection to suspicious port 3389 from 192.168.1.42".to_string(),
            confidence: 0.6,
        },
        ThreatAlert {
            timestamp: base,
            threat_type: "DDOS".to_string(),
            severity: Severity::Critical,
            source_ip: "10.0.0.13".to_string(),
            description: "Potential DDoS attack from 10.0.0.13".to_string(),
            confidence: 0.9,
        },
    ]
}

struct MockWorld {
    data: MockData,
    is_monitoring: bool,
    started: Instant,
    packets: u64,
    alerts: Vec<ThreatAlert>,
}

/// In-process backend with the same observable behavior as the real service.
pub struct MockBackend {
    world: Mutex<MockWorld>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_data(MockData::new())
    }

    pub fn with_data(data: MockData) -> Self {
        Self {
            world: Mutex::new(MockWorld {
                data,
                is_monitoring: false,
                started: Instant::now(),
                packets: 0,
                alerts: Vec::new(),
            }),
        }
    }

    fn world(&self) -> MutexGuard<'_, MockWorld> {
        self.world.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Advance the simulation one poll and return the resulting status.
    pub fn poll_status(&self) -> SystemStatus {
        let mut guard = self.world();
        let world = &mut *guard;
        if world.is_monitoring {
            world.packets += world.data.rng.gen_range(50..500);
            if world.data.rng.gen_bool(MOCK_ALERT_PROBABILITY) {
                let alert = world.data.alert(epoch_now());
                tracing::debug!(threat = %alert.threat_type, source = %alert.source_ip, "mock alert");
                world.alerts.push(alert);
            }
        }
        let suspicious: HashSet<&str> = world.alerts.iter().map(|a| a.source_ip.as_str()).collect();
        SystemStatus {
            is_monitoring: world.is_monitoring,
            packets_captured: world.packets,
            threat_alerts: world.alerts.len() as u64,
            suspicious_ips: suspicious.len() as u64,
            uptime_secs: world.started.elapsed().as_secs_f64(),
        }
    }

    /// Alerts recorded so far, newest first.
    pub fn recent_alerts(&self) -> Vec<ThreatAlert> {
        self.world().alerts.iter().rev().cloned().collect()
    }

    /// Record an alert directly.
    pub fn inject_alert(&self, alert: ThreatAlert) {
        self.world().alerts.push(alert);
    }

    pub fn set_monitoring(&self, active: bool) -> MonitoringAck {
        let mut world = self.world();
        let status = match (active, world.is_monitoring) {
            (true, true) => "Monitoring already active",
            (true, false) => {
                world.is_monitoring = true;
                world.started = Instant::now();
                "Monitoring started"
            }
            (false, false) => "Monitoring already inactive",
            (false, true) => {
                world.is_monitoring = false;
                "Monitoring stopped"
            }
        };
        MonitoringAck {
            status: status.to_string(),
            is_monitoring: world.is_monitoring,
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MockBackend {
    async fn get_status(&self) -> Result<SystemStatus, DashboardError> {
        Ok(self.poll_status())
    }

    async fn get_alerts(&self) -> Result<Vec<ThreatAlert>, DashboardError> {
        Ok(self.recent_alerts())
    }

    async fn start_monitoring(&self) -> Result<MonitoringAck, DashboardError> {
        Ok(self.set_monitoring(true))
    }

    async fn stop_monitoring(&self) -> Result<MonitoringAck, DashboardError> {
        Ok(self.set_monitoring(false))
    }
}
