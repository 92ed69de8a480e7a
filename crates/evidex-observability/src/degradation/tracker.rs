//! Record every degradation event: component, failure mode, fallback used,
//! timestamp, recovery status.

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use evidex_core::models::DegradationEvent;
use serde::{Deserialize, Serialize};

/// Events kept before the oldest are dropped.
pub const MAX_TRACKED_EVENTS: usize = 1_000;

/// Recovery status of a degradation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still in degraded mode.
    Active,
    /// Recovered to normal operation.
    Recovered,
}

/// A tracked degradation event with recovery status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Tracks degradation events across calls for reporting.
#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    events: VecDeque<TrackedDegradation>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new degradation event. The stage that degraded has already
    /// logged it.
    pub fn record(&mut self, event: DegradationEvent) {
        if self.events.len() == MAX_TRACKED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
    }

    /// Fold in the degradations of one finished retrieval call. Every
    /// component that was degraded before but not during this call is
    /// marked recovered.
    pub fn record_call(&mut self, events: &[DegradationEvent]) {
        let degraded_now: BTreeSet<&str> = events.iter().map(|e| e.component.as_str()).collect();
        let recovered: Vec<String> = self
            .active_components()
            .into_iter()
            .filter(|c| !degraded_now.contains(c.as_str()))
            .collect();
        for component in recovered {
            self.mark_recovered(&component);
        }
        for event in events {
            self.record(event.clone());
        }
    }

    /// Mark every active degradation of a component as recovered.
    pub fn mark_recovered(&mut self, component: &str) {
        let now = Utc::now();
        for tracked in self.events.iter_mut() {
            if tracked.event.component == component
                && tracked.recovery_status == RecoveryStatus::Active
            {
                tracked.recovery_status = RecoveryStatus::Recovered;
                tracked.recovered_at = Some(now);
            }
        }
    }

    /// All retained events, oldest first.
    pub fn events(&self) -> Vec<&TrackedDegradation> {
        self.events.iter().collect()
    }

    /// Get active (unrecovered) degradations.
    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    /// Components with at least one active degradation, sorted.
    pub fn active_components(&self) -> Vec<String> {
        self.active_degradations()
            .into_iter()
            .map(|t| t.event.component.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.events.iter().any(|t| {
            t.event.component == component && t.recovery_status == RecoveryStatus::Active
        })
    }

    /// Count events in the last N seconds for a given component.
    pub fn count_recent(&self, component: &str, window_secs: i64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::seconds(window_secs);
        self.events
            .iter()
            .filter(|t| t.event.component == component && t.event.timestamp > cutoff)
            .count()
    }

    /// Duration a component has been continuously degraded, or None if not degraded.
    pub fn degraded_duration(&self, component: &str) -> Option<chrono::Duration> {
        let earliest = self
            .events
            .iter()
            .filter(|t| {
                t.event.component == component && t.recovery_status == RecoveryStatus::Active
            })
            .map(|t| t.event.timestamp)
            .min()?;
        Some(Utc::now() - earliest)
    }
}
