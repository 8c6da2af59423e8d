//! Component Health Monitoring
//!
//! Microglia continuously sample the tissue they supervise (Nimmerjahn
//! et al. 2005: resting microglia rescan their territory every few hours).
//! The monitor turns each observation - activity level, connection count,
//! recency - into a bounded health score and a set of named issues.
//!
//! Scoring multiplies a base of 1.0 by a configured penalty for each
//! condition that holds, then clamps to [0, 1]. Non-finite inputs are
//! treated as the worst tier and never propagate into scores.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::HealthConfig;

// ============================================================================
// ISSUES
// ============================================================================

/// Named conditions detected during a health update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthIssue {
    /// Activity below the critical threshold
    CriticallyLowActivity,
    /// Activity below the very-low threshold
    VeryLowActivity,
    /// Activity below the low threshold
    LowActivity,
    /// Activity below the moderate threshold
    ModerateLowActivity,
    /// No connections at all
    IsolatedComponent,
    /// Fewer connections than the poorly-connected threshold
    PoorlyConnected,
    /// Zero observed activity
    InactiveComponent,
    /// Not observed within the staleness window
    StaleComponent,
    /// Low activity sustained across many patrols
    PersistentlyInactive,
}

impl HealthIssue {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthIssue::CriticallyLowActivity => "criticallyLowActivity",
            HealthIssue::VeryLowActivity => "veryLowActivity",
            HealthIssue::LowActivity => "lowActivity",
            HealthIssue::ModerateLowActivity => "moderateLowActivity",
            HealthIssue::IsolatedComponent => "isolatedComponent",
            HealthIssue::PoorlyConnected => "poorlyConnected",
            HealthIssue::InactiveComponent => "inactiveComponent",
            HealthIssue::StaleComponent => "staleComponent",
            HealthIssue::PersistentlyInactive => "persistentlyInactive",
        }
    }
}

impl std::fmt::Display for HealthIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SURVEILLANCE STATE
// ============================================================================

/// Where a component sits in the patrol state machine:
/// Fresh -> Monitored -> IssueFlagged -> (PersistentlyInactive | Recovered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SurveillanceState {
    /// Never observed
    #[default]
    Fresh,
    /// Observed with no issues
    Monitored,
    /// At least one issue on the latest observation
    IssueFlagged,
    /// Low activity sustained long enough to draw the consistency penalty
    PersistentlyInactive,
    /// Previously flagged, now clean
    Recovered,
}

// ============================================================================
// HEALTH RECORD
// ============================================================================

/// The monitor's view of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    /// Component id
    pub id: String,
    /// Composite score in [0, 1]
    pub health_score: f64,
    /// Last observed activity level in [0, 1]
    pub activity_level: f64,
    /// Last observed connection count
    pub connection_count: usize,
    /// When the component was last observed
    pub last_seen: DateTime<Utc>,
    /// Issues detected on the latest observation
    pub issues: Vec<HealthIssue>,
    /// Number of observations, incremented once per update
    pub patrol_count: u64,
    /// Patrol state machine position
    pub state: SurveillanceState,
}

// ============================================================================
// HEALTH MONITOR
// ============================================================================

/// Scores component health from patrol observations.
#[derive(Debug, Default)]
pub struct HealthMonitor {
    config: RwLock<HealthConfig>,
    records: RwLock<HashMap<String, ComponentHealth>>,
}

impl HealthMonitor {
    /// Create a monitor with the given thresholds
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config: RwLock::new(config),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Swap the scoring configuration; applies to subsequent updates
    pub fn set_config(&self, config: HealthConfig) {
        *self.config.write() = config;
    }

    /// Record an observation and recompute the component's health.
    ///
    /// Identical inputs produce identical scores; the patrol counter
    /// increases by exactly one per call. Non-finite activity is treated
    /// as zero (worst tier).
    pub fn update(&self, id: &str, activity_level: f64, connection_count: usize) -> ComponentHealth {
        let config = self.config.read().clone();

        let activity = if activity_level.is_finite() {
            activity_level.clamp(0.0, 1.0)
        } else {
            tracing::warn!(id, activity_level, "non-finite activity treated as worst tier");
            0.0
        };

        let now = Utc::now();
        let mut records = self.records.write();
        let previous = records.get(id);
        let patrol_count = previous.map(|r| r.patrol_count).unwrap_or(0) + 1;
        let previous_state = previous.map(|r| r.state).unwrap_or_default();
        let elapsed = previous.map(|r| now.signed_duration_since(r.last_seen));

        let mut score: f64 = 1.0;
        let mut issues = Vec::new();

        // Activity tiers
        if activity < config.critical_activity {
            score *= config.critical_activity_penalty;
            issues.push(HealthIssue::CriticallyLowActivity);
        } else if activity < config.very_low_activity {
            score *= config.very_low_activity_penalty;
            issues.push(HealthIssue::VeryLowActivity);
        } else if activity < config.low_activity {
            score *= config.low_activity_penalty;
            issues.push(HealthIssue::LowActivity);
        } else if activity < config.moderate_activity {
            score *= config.moderate_activity_penalty;
            issues.push(HealthIssue::ModerateLowActivity);
        }
        if activity == 0.0 {
            issues.push(HealthIssue::InactiveComponent);
        }

        // Connection tiers
        if connection_count == 0 {
            score *= config.isolated_penalty;
            issues.push(HealthIssue::IsolatedComponent);
        } else if connection_count < config.poorly_connected_threshold {
            score *= config.poorly_connected_penalty;
            issues.push(HealthIssue::PoorlyConnected);
        } else if connection_count < config.few_connections_threshold {
            score *= config.few_connections_penalty;
        }

        // Staleness relative to the previous observation
        if let Some(elapsed) = elapsed {
            if let Ok(elapsed) = elapsed.to_std() {
                if elapsed > config.very_stale_after {
                    score *= config.very_stale_penalty;
                    issues.push(HealthIssue::StaleComponent);
                } else if elapsed > config.stale_after {
                    score *= config.stale_penalty;
                    issues.push(HealthIssue::StaleComponent);
                }
            }
        }

        // Consistency: persistently inactive across many patrols
        let persistent = patrol_count > config.consistency_patrol_count
            && activity < config.consistency_activity;
        if persistent {
            score *= config.consistency_penalty;
            issues.push(HealthIssue::PersistentlyInactive);
        }

        let state = if persistent {
            SurveillanceState::PersistentlyInactive
        } else if !issues.is_empty() {
            SurveillanceState::IssueFlagged
        } else {
            match previous_state {
                SurveillanceState::IssueFlagged | SurveillanceState::PersistentlyInactive => {
                    SurveillanceState::Recovered
                }
                _ => SurveillanceState::Monitored,
            }
        };

        let record = ComponentHealth {
            id: id.to_string(),
            health_score: if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 },
            activity_level: activity,
            connection_count,
            last_seen: now,
            issues,
            patrol_count,
            state,
        };
        records.insert(id.to_string(), record.clone());
        record
    }

    /// Snapshot of a component's health record
    pub fn get(&self, id: &str) -> Option<ComponentHealth> {
        self.records.read().get(id).cloned()
    }

    /// Health score for a component, 0.5 (neutral) when untracked.
    /// Used by the pruning engine's functional-redundancy term.
    pub fn score_or_neutral(&self, id: &str) -> f64 {
        self.records
            .read()
            .get(id)
            .map(|r| r.health_score)
            .unwrap_or(0.5)
    }

    /// Drop a component's health record (on unregister)
    pub fn remove(&self, id: &str) -> bool {
        self.records.write().remove(id).is_some()
    }

    /// Number of tracked components
    pub fn tracked_count(&self) -> usize {
        self.records.read().len()
    }

    /// Records whose latest score falls below `threshold`
    pub fn problems(&self, threshold: f64) -> Vec<ComponentHealth> {
        self.records
            .read()
            .values()
            .filter(|r| r.health_score < threshold)
            .cloned()
            .collect()
    }
}
