//! Connection Pruning
//!
//! Synaptic pruning with a mark/score/execute cycle: connections are
//! marked as candidates, scored once at mark time, and pruned only after
//! both an age gate and a score gate pass. The age gate mirrors the
//! biological observation that elimination follows sustained disuse, not a
//! single quiet interval.
//!
//! Scores combine inactivity, redundancy, and metabolic cost. Computing
//! them queries the registry and health monitor, so the engine releases
//! its own lock first, computes, then re-acquires to store - holding the
//! engine lock across those queries would invert the lock order used by
//! callers feeding the engine.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::PruningConfig;
use crate::registry::ComponentRegistry;

use super::health::HealthMonitor;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Score assigned when mark inputs are invalid (empty id, non-finite
/// activity)
pub const MODERATE_DEFAULT_SCORE: f64 = 0.5;

/// Connection count at which the redundancy connection factor saturates
const REDUNDANCY_CONNECTION_SATURATION: f64 = 10.0;

/// Distance (um) at which spatial redundancy reaches zero
const REDUNDANCY_DISTANCE_SCALE: f64 = 100.0;

/// Distance (um) at which metabolic distance cost saturates
const METABOLIC_DISTANCE_SCALE: f64 = 200.0;

/// Neutral stand-in when an endpoint cannot be measured
const NEUTRAL_FACTOR: f64 = 0.5;

// Sub-weights within the redundancy term
const REDUNDANCY_CONNECTION_WEIGHT: f64 = 0.3;
const REDUNDANCY_SPATIAL_WEIGHT: f64 = 0.4;
const REDUNDANCY_FUNCTIONAL_WEIGHT: f64 = 0.3;

// Sub-weights within the metabolic term
const METABOLIC_DISTANCE_WEIGHT: f64 = 0.4;
const METABOLIC_EFFICIENCY_WEIGHT: f64 = 0.4;
const METABOLIC_HEALTH_WEIGHT: f64 = 0.2;

// ============================================================================
// PRUNING TARGET
// ============================================================================

/// A connection marked for potential elimination.
///
/// The score is computed at mark time and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruningTarget {
    /// Connection (synapse) id
    pub connection_id: String,
    /// Pre-synaptic endpoint
    pub source_id: String,
    /// Post-synaptic endpoint
    pub target_id: String,
    /// Activity level reported at mark time, clamped to [0, 1]
    pub activity_level: f64,
    /// Last known use of the connection
    pub last_used: DateTime<Utc>,
    /// When the target was marked
    pub marked_at: DateTime<Utc>,
    /// Elimination score in [0, 1]
    pub score: f64,
}

// ============================================================================
// PRUNING ENGINE
// ============================================================================

/// Marks, scores, and executes connection pruning.
#[derive(Debug)]
pub struct PruningEngine {
    registry: Arc<ComponentRegistry>,
    health: Arc<HealthMonitor>,
    config: RwLock<PruningConfig>,
    targets: RwLock<HashMap<String, PruningTarget>>,
}

impl PruningEngine {
    /// Create an engine over the shared registry and health monitor
    pub fn new(
        registry: Arc<ComponentRegistry>,
        health: Arc<HealthMonitor>,
        config: PruningConfig,
    ) -> Self {
        Self {
            registry,
            health,
            config: RwLock::new(config),
            targets: RwLock::new(HashMap::new()),
        }
    }

    /// Swap the pruning configuration; applies to subsequent calls
    pub fn set_config(&self, config: PruningConfig) {
        *self.config.write() = config;
    }

    /// Mark a connection as a pruning candidate.
    ///
    /// Invalid input (empty ids, non-finite activity) yields the moderate
    /// default score instead of an error. The score is computed before the
    /// target map lock is taken.
    pub fn mark(
        &self,
        connection_id: &str,
        source_id: &str,
        target_id: &str,
        activity_level: f64,
    ) -> PruningTarget {
        let config = self.config.read().clone();

        let invalid = connection_id.is_empty()
            || source_id.is_empty()
            || target_id.is_empty()
            || !activity_level.is_finite();

        let activity = if activity_level.is_finite() {
            activity_level.clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Score with no engine lock held; both helpers query collaborators.
        let score = if invalid {
            tracing::warn!(
                connection_id,
                source_id,
                target_id,
                "invalid pruning mark, using moderate default score"
            );
            MODERATE_DEFAULT_SCORE
        } else {
            let raw = config.base_score
                + (1.0 - activity) * config.activity_weight
                + self.redundancy(source_id, target_id) * config.redundancy_weight
                + self.metabolic_cost(source_id, target_id, activity) * config.metabolic_weight;
            if raw.is_finite() {
                raw.clamp(0.0, config.max_score.clamp(0.0, 1.0))
            } else {
                MODERATE_DEFAULT_SCORE
            }
        };

        let now = Utc::now();
        let target = PruningTarget {
            connection_id: connection_id.to_string(),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            activity_level: activity,
            last_used: now,
            marked_at: now,
            score,
        };
        self.targets
            .write()
            .insert(connection_id.to_string(), target.clone());
        target
    }

    /// Redundancy of a connection: how replaceable it is.
    ///
    /// Combines endpoint connection counts, spatial proximity (short
    /// connections are more redundant), and functional similarity
    /// (similar health scores suggest overlapping roles).
    fn redundancy(&self, source_id: &str, target_id: &str) -> f64 {
        let saturate =
            |count: usize| (count as f64 / REDUNDANCY_CONNECTION_SATURATION).clamp(0.0, 1.0);
        let connection_factor = (saturate(self.registry.connection_count(source_id))
            + saturate(self.registry.connection_count(target_id)))
            / 2.0;

        let spatial_factor = self
            .registry
            .distance(source_id, target_id)
            .filter(|d| d.is_finite())
            .map(|d| 1.0 - (d / REDUNDANCY_DISTANCE_SCALE).clamp(0.0, 1.0))
            .unwrap_or(NEUTRAL_FACTOR);

        let functional_factor = {
            let a = self.health.score_or_neutral(source_id);
            let b = self.health.score_or_neutral(target_id);
            1.0 - (a - b).abs().clamp(0.0, 1.0)
        };

        (connection_factor * REDUNDANCY_CONNECTION_WEIGHT
            + spatial_factor * REDUNDANCY_SPATIAL_WEIGHT
            + functional_factor * REDUNDANCY_FUNCTIONAL_WEIGHT)
            .clamp(0.0, 1.0)
    }

    /// Metabolic cost of keeping a connection.
    ///
    /// Long connections cost transport; extreme activity (silent or
    /// saturated) costs more than moderate firing; unhealthy endpoints
    /// cost maintenance.
    fn metabolic_cost(&self, source_id: &str, target_id: &str, activity: f64) -> f64 {
        let distance_cost = self
            .registry
            .distance(source_id, target_id)
            .filter(|d| d.is_finite())
            .map(|d| (d / METABOLIC_DISTANCE_SCALE).clamp(0.0, 1.0))
            .unwrap_or(NEUTRAL_FACTOR);

        let efficiency_cost = (2.0 * (activity - 0.5)).powi(2).clamp(0.0, 1.0);

        let health_cost = {
            let a = self.health.score_or_neutral(source_id);
            let b = self.health.score_or_neutral(target_id);
            1.0 - ((a + b) / 2.0).clamp(0.0, 1.0)
        };

        (distance_cost * METABOLIC_DISTANCE_WEIGHT
            + efficiency_cost * METABOLIC_EFFICIENCY_WEIGHT
            + health_cost * METABOLIC_HEALTH_WEIGHT)
            .clamp(0.0, 1.0)
    }

    /// Prune every target that passes both gates: age at least the
    /// threshold AND score strictly above the threshold.
    ///
    /// Pruned targets leave the pending set. The returned connection ids
    /// are for the caller to dispatch; the engine does not delete the
    /// underlying synapse records itself.
    pub fn execute(&self) -> Vec<String> {
        let config = self.config.read().clone();
        let now = Utc::now();
        let mut targets = self.targets.write();

        let pruned: Vec<String> = targets
            .values()
            .filter(|t| {
                let age = now.signed_duration_since(t.marked_at).to_std().ok();
                age.map(|a| a >= config.age_threshold).unwrap_or(false)
                    && t.score > config.score_threshold
            })
            .map(|t| t.connection_id.clone())
            .collect();

        for id in &pruned {
            targets.remove(id);
        }
        if !pruned.is_empty() {
            tracing::info!(count = pruned.len(), "pruning executed");
        }
        pruned
    }

    /// Snapshot of all pending targets
    pub fn candidates(&self) -> Vec<PruningTarget> {
        self.targets.read().values().cloned().collect()
    }

    /// Snapshot of one pending target
    pub fn get(&self, connection_id: &str) -> Option<PruningTarget> {
        self.targets.read().get(connection_id).cloned()
    }

    /// Number of pending targets
    pub fn pending_count(&self) -> usize {
        self.targets.read().len()
    }

    /// Drop pending targets with an endpoint at the removed component
    pub fn remove_for_component(&self, id: &str) {
        self.targets
            .write()
            .retain(|_, t| t.source_id != id && t.target_id != id);
    }

    /// Drop a single pending target
    pub fn unmark(&self, connection_id: &str) -> bool {
        self.targets.write().remove(connection_id).is_some()
    }
}
