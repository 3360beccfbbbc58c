//! Alert ledger: resolution and critical-notification bookkeeping.
//!
//! The ledger holds the most recent alerts fetch plus two process-lifetime
//! sets keyed by [`AlertId`]:
//! - `resolved`: alerts the user acknowledged; excluded from the active count.
//! - `notified`: critical alerts already announced; never announced again.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::domain::{AlertId, Severity, ThreatAlert};

/// Whether a resolved alert can be un-resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePolicy {
    /// Resolution is permanent (backend-sourced alerts).
    #[default]
    Monotonic,
    /// Resolution can be flipped back (self-contained mock mode).
    Toggle,
}

#[derive(Debug, Default)]
pub struct AlertBook {
    alerts: Vec<ThreatAlert>,
    resolved: HashSet<AlertId>,
    notified: HashSet<AlertId>,
    policy: ResolvePolicy,
}

impl AlertBook {
    pub fn new(policy: ResolvePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ResolvePolicy {
        self.policy
    }

    /// Replace the current alerts with a fresh fetch.
    ///
    /// Returns the active critical alerts that have not been announced yet and
    /// marks them as announced.
    pub fn ingest(&mut self, alerts: Vec<ThreatAlert>) -> Vec<ThreatAlert> {
        self.alerts = alerts;
        let mut announce = Vec::new();
        for alert in &self.alerts {
            if !alert.is_critical() {
                continue;
            }
            let id = alert.id();
            if self.resolved.contains(&id) {
                continue;
            }
            if self.notified.insert(id) {
                announce.push(alert.clone());
            }
        }
        announce
    }

    /// Replace the current alerts without announcing anything.
    pub fn replace_silently(&mut self, alerts: Vec<ThreatAlert>) {
        self.alerts = alerts;
    }

    /// Mark an alert as resolved. Returns `true` if it was not resolved before.
    pub fn resolve(&mut self, id: &AlertId) -> bool {
        self.resolved.insert(id.clone())
    }

    /// Flip the resolution state of an alert and return the new state.
    ///
    /// Under [`ResolvePolicy::Monotonic`] a resolved alert stays resolved.
    pub fn toggle(&mut self, id: &AlertId) -> bool {
        if self.resolved.contains(id) {
            if self.policy == ResolvePolicy::Toggle {
                self.resolved.remove(id);
                return false;
            }
            return true;
        }
        self.resolved.insert(id.clone());
        true
    }

    pub fn is_resolved(&self, id: &AlertId) -> bool {
        self.resolved.contains(id)
    }

    /// Every alert from the last fetch, newest first as delivered.
    pub fn all(&self) -> &[ThreatAlert] {
        &self.alerts
    }

    /// Alert at a 1-based display position.
    pub fn nth(&self, position: usize) -> Option<&ThreatAlert> {
        position.checked_sub(1).and_then(|i| self.alerts.get(i))
    }

    pub fn active(&self) -> impl Iterator<Item = &ThreatAlert> + '_ {
        self.alerts
            .iter()
            .filter(move |alert| !self.resolved.contains(&alert.id()))
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Fetched alerts whose id is in the resolved set.
    pub fn resolved_count(&self) -> usize {
        self.alerts.len() - self.active_count()
    }

    /// Active alerts per severity, most severe first, zero counts included.
    pub fn severity_breakdown(&self) -> Vec<(Severity, usize)> {
        let mut counts: HashMap<Severity, usize> = HashMap::new();
        for alert in self.active() {
            *counts.entry(alert.severity).or_insert(0) += 1;
        }
        Severity::RANKED
            .iter()
            .map(|severity| (*severity, counts.get(severity).copied().unwrap_or(0)))
            .collect()
    }

    /// Active alerts per threat type, sorted by name.
    pub fn threat_type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for alert in self.active() {
            *counts.entry(alert.threat_type.clone()).or_insert(0) += 1;
        }
        counts
    }
}
