pub mod domain {
    use chrono::{DateTime, Local, TimeZone, Utc};
    use std::fmt;

    /// Alert severity as reported by the backend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum Severity {
        Unknown,
        Low,
        Medium,
        High,
        Critical,
    }

    impl Severity {
        /// Case-insensitive parse. Anything unrecognised becomes `Unknown`.
        pub fn parse(raw: &str) -> Self {
            match raw.trim().to_ascii_lowercase().as_str() {
                "low" => Severity::Low,
                "medium" => Severity::Medium,
                "high" => Severity::High,
                "critical" => Severity::Critical,
                _ => Severity::Unknown,
            }
        }

        pub fn as_str(&self) -> &'static str {
            match self {
                Severity::Unknown => "UNKNOWN",
                Severity::Low => "LOW",
                Severity::Medium => "MEDIUM",
                Severity::High => "HIGH",
                Severity::Critical => "CRITICAL",
            }
        }

        pub const RANKED: [Severity; 5] = [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::Unknown,
        ];
    }

    impl fmt::Display for Severity {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Client-side alert identity: the epoch timestamp joined to the source address.
    ///
    /// The timestamp keeps its fractional part (`1718000000.5-10.0.0.1`); a
    /// whole-second value prints without one. The backend issues no identifier
    /// of its own, so two alerts from one source with an identical timestamp
    /// share an id.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct AlertId(String);

    impl AlertId {
        pub fn new(timestamp: f64, source_ip: &str) -> Self {
            AlertId(format!("{timestamp}-{source_ip}"))
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for AlertId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SystemStatus {
        pub is_monitoring: bool,
        pub packets_captured: u64,
        pub threat_alerts: u64,
        pub suspicious_ips: u64,
        pub uptime_secs: f64,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ThreatAlert {
        pub timestamp: f64,
        pub threat_type: String,
        pub severity: Severity,
        pub source_ip: String,
        pub description: String,
        pub confidence: f64,
    }

    impl ThreatAlert {
        pub fn id(&self) -> AlertId {
            AlertId::new(self.timestamp, &self.source_ip)
        }

        pub fn is_critical(&self) -> bool {
            self.severity == Severity::Critical
        }

        pub fn occurred_at(&self) -> Option<DateTime<Local>> {
            let secs = self.timestamp.floor() as i64;
            let nanos = ((self.timestamp - self.timestamp.floor()) * 1e9) as u32;
            Utc.timestamp_opt(secs, nanos)
                .single()
                .map(|at| at.with_timezone(&Local))
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MonitoringAck {
        pub status: String,
        pub is_monitoring: bool,
    }

    /// A nearby access point as shown in the device list.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Device {
        pub bssid: String,
        pub ssid: String,
        pub vendor: String,
        pub rssi_dbm: i32,
        pub channel: u8,
        pub clients: u32,
        /// Set when the SSID is broadcast by more than one BSSID.
        pub is_suspect: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct SignalSample {
        pub at: DateTime<Local>,
        pub readings: Vec<(String, i32)>,
    }

    impl SignalSample {
        /// Strongest reading in the sample, if any.
        pub fn peak(&self) -> Option<i32> {
            self.readings.iter().map(|(_, rssi)| *rssi).max()
        }
    }
}

pub mod dto {
    use serde::{Deserialize, Serialize};

    use super::domain::{MonitoringAck, Severity, SystemStatus, ThreatAlert};

    #[derive(Debug, Serialize, Deserialize, Clone, Default)]
    #[serde(default)]
    pub struct StatusDto {
        pub is_monitoring: bool,
        pub packets_captured: u64,
        pub threat_alerts: u64,
        pub suspicious_ips: u64,
        pub uptime: f64,
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub struct AlertDto {
        pub timestamp: f64,
        pub threat_type: String,
        pub severity: String,
        pub source_ip: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub confidence: f64,
    }

    #[derive(Debug, Serialize, Deserialize, Clone)]
    pub struct MonitoringAckDto {
        pub status: String,
        pub is_monitoring: bool,
    }

    impl From<StatusDto> for SystemStatus {
        fn from(dto: StatusDto) -> Self {
            SystemStatus {
                is_monitoring: dto.is_monitoring,
                packets_captured: dto.packets_captured,
                threat_alerts: dto.threat_alerts,
                suspicious_ips: dto.suspicious_ips,
                uptime_secs: dto.uptime.max(0.0),
            }
        }
    }

    impl From<&SystemStatus> for StatusDto {
        fn from(status: &SystemStatus) -> Self {
            StatusDto {
                is_monitoring: status.is_monitoring,
                packets_captured: status.packets_captured,
                threat_alerts: status.threat_alerts,
                suspicious_ips: status.suspicious_ips,
                uptime: status.uptime_secs,
            }
        }
    }

    impl From<AlertDto> for ThreatAlert {
        fn from(dto: AlertDto) -> Self {
            let confidence = if dto.confidence.is_finite() {
                dto.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
            ThreatAlert {
                timestamp: dto.timestamp,
                threat_type: dto.threat_type,
                severity: Severity::parse(&dto.severity),
                source_ip: dto.source_ip,
                description: dto.description,
                confidence,
            }
        }
    }

    impl From<&ThreatAlert> for AlertDto {
        fn from(alert: &ThreatAlert) -> Self {
            AlertDto {
                timestamp: alert.timestamp,
                threat_type: alert.threat_type.clone(),
                severity: alert.severity.as_str().to_string(),
                source_ip: alert.source_ip.clone(),
                description: alert.description.clone(),
                confidence: alert.confidence,
            }
        }
    }

    impl From<MonitoringAckDto> for MonitoringAck {
        fn from(dto: MonitoringAckDto) -> Self {
            MonitoringAck {
                status: dto.status,
                is_monitoring: dto.is_monitoring,
            }
        }
    }

    impl From<&MonitoringAck> for MonitoringAckDto {
        fn from(ack: &MonitoringAck) -> Self {
            MonitoringAckDto {
                status: ack.status.clone(),
                is_monitoring: ack.is_monitoring,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::domain::*;
    use super::dto::*;

    #[test]
    fn test_severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse("critical"), Severity::Critical);
        assert_eq!(Severity::parse(" High "), Severity::High);
        assert_eq!(Severity::parse("medium"), Severity::Medium);
        assert_eq!(Severity::parse("Low"), Severity::Low);
        assert_eq!(Severity::parse("severe"), Severity::Unknown);
    }

    #[test]
    fn test_alert_id_keeps_fractional_timestamp() {
        assert_eq!(
            AlertId::new(1718000000.75, "10.0.0.5").as_str(),
            "1718000000.75-10.0.0.5"
        );
        assert_eq!(
            AlertId::new(1718000000.0, "10.0.0.5").as_str(),
            "1718000000-10.0.0.5"
        );
        assert_ne!(
            AlertId::new(1718000000.123456, "192.168.1.77"),
            AlertId::new(1718000000.123789, "192.168.1.77")
        );
        assert_ne!(
            AlertId::new(1718000000.0, "10.0.0.5"),
            AlertId::new(1718000000.0, "10.0.0.6")
        );
        assert_eq!(
            AlertId::new(1718000000.5, "10.0.0.5"),
            AlertId::new(1718000000.5, "10.0.0.5")
        );
    }

    #[test]
    fn test_backend_alert_json_decodes() {
        let raw = r#"{
            "timestamp": 1718000000.5,
            "threat_type": "DDOS",
            "severity": "CRITICAL",
            "source_ip": "192.168.1.77",
            "description": "Potential DDoS attack from 192.168.1.77",
            "confidence": 0.9
        }"#;
        let dto: AlertDto = serde_json::from_str(raw).unwrap();
        let alert = ThreatAlert::from(dto);
        assert!(alert.is_critical());
        assert_eq!(alert.id().as_str(), "1718000000.5-192.168.1.77");
        assert!(alert.occurred_at().is_some());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let dto = AlertDto {
            timestamp: 1.0,
            threat_type: "ANOMALY".into(),
            severity: "MEDIUM".into(),
            source_ip: "10.0.0.1".into(),
            description: String::new(),
            confidence: 1.7,
        };
        assert_eq!(ThreatAlert::from(dto).confidence, 1.0);
    }

    #[test]
    fn test_status_json_with_float_uptime_decodes() {
        let raw = r#"{"is_monitoring": true, "packets_captured": 1200,
                      "threat_alerts": 3, "suspicious_ips": 2, "uptime": 15780.42}"#;
        let status = SystemStatus::from(serde_json::from_str::<StatusDto>(raw).unwrap());
        assert!(status.is_monitoring);
        assert_eq!(status.packets_captured, 1200);
        assert_eq!(status.uptime_secs, 15780.42);
    }

    #[test]
    fn test_status_missing_fields_default_to_zero() {
        let status = SystemStatus::from(serde_json::from_str::<StatusDto>("{}").unwrap());
        assert_eq!(status, SystemStatus::default());
    }

    #[test]
    fn test_signal_sample_peak() {
        let sample = SignalSample {
            at: chrono::Local::now(),
            readings: vec![("home".into(), -61), ("cafe".into(), -48)],
        };
        assert_eq!(sample.peak(), Some(-48));
    }
}
