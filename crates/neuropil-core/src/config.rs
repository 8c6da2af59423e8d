//! Coordination Configuration
//!
//! One structured record with four groups - health thresholds, pruning
//! settings, patrol settings, resource limits - plus three presets:
//!
//! | Preset       | Character                                           |
//! |--------------|-----------------------------------------------------|
//! | Default      | Biologically realistic                              |
//! | Conservative | Lenient thresholds, long pruning ages               |
//! | Aggressive   | Strict thresholds, fast pruning, frequent patrols   |
//!
//! Every numeric field has a default. Configuration may be swapped at any
//! time and takes effect for subsequent calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// HEALTH
// ============================================================================

/// Thresholds and penalties for component health scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthConfig {
    /// Activity below this is critically low
    pub critical_activity: f64,
    /// Activity below this is very low
    pub very_low_activity: f64,
    /// Activity below this is low
    pub low_activity: f64,
    /// Activity below this is moderately low
    pub moderate_activity: f64,
    /// Score multiplier for critically low activity
    pub critical_activity_penalty: f64,
    /// Score multiplier for very low activity
    pub very_low_activity_penalty: f64,
    /// Score multiplier for low activity
    pub low_activity_penalty: f64,
    /// Score multiplier for moderately low activity
    pub moderate_activity_penalty: f64,
    /// Connections below this count as poorly connected
    pub poorly_connected_threshold: usize,
    /// Connections below this count as few
    pub few_connections_threshold: usize,
    /// Score multiplier for an isolated component (zero connections)
    pub isolated_penalty: f64,
    /// Score multiplier for a poorly connected component
    pub poorly_connected_penalty: f64,
    /// Score multiplier for a component with few connections
    pub few_connections_penalty: f64,
    /// Not seen for longer than this is stale
    pub stale_after: Duration,
    /// Not seen for longer than this is very stale
    pub very_stale_after: Duration,
    /// Score multiplier for staleness
    pub stale_penalty: f64,
    /// Score multiplier for heavy staleness
    pub very_stale_penalty: f64,
    /// Patrols after which persistent low activity draws the
    /// consistency penalty
    pub consistency_patrol_count: u64,
    /// Activity below this across many patrols marks persistent inactivity
    pub consistency_activity: f64,
    /// Score multiplier for persistent inactivity
    pub consistency_penalty: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            critical_activity: 0.02,
            very_low_activity: 0.05,
            low_activity: 0.15,
            moderate_activity: 0.30,
            critical_activity_penalty: 0.2,
            very_low_activity_penalty: 0.4,
            low_activity_penalty: 0.6,
            moderate_activity_penalty: 0.8,
            poorly_connected_threshold: 3,
            few_connections_threshold: 5,
            isolated_penalty: 0.5,
            poorly_connected_penalty: 0.7,
            few_connections_penalty: 0.9,
            stale_after: Duration::from_secs(30 * 60),
            very_stale_after: Duration::from_secs(60 * 60),
            stale_penalty: 0.8,
            very_stale_penalty: 0.6,
            consistency_patrol_count: 5,
            consistency_activity: 0.15,
            consistency_penalty: 0.7,
        }
    }
}

// ============================================================================
// PRUNING
// ============================================================================

/// Scoring weights and gates for connection pruning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruningConfig {
    /// Base score applied to every marked target
    pub base_score: f64,
    /// Weight of the inactivity term
    pub activity_weight: f64,
    /// Weight of the redundancy term
    pub redundancy_weight: f64,
    /// Weight of the metabolic-cost term
    pub metabolic_weight: f64,
    /// Upper clamp for computed scores
    pub max_score: f64,
    /// Minimum age before a marked target may be pruned
    pub age_threshold: Duration,
    /// Minimum score for a target to be pruned
    pub score_threshold: f64,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            base_score: 0.1,
            activity_weight: 0.45,
            redundancy_weight: 0.25,
            metabolic_weight: 0.2,
            max_score: 1.0,
            age_threshold: Duration::from_secs(24 * 60 * 60),
            score_threshold: 0.8,
        }
    }
}

// ============================================================================
// PATROL
// ============================================================================

/// Territorial surveillance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolConfig {
    /// Default interval between patrols of one route
    pub patrol_rate: Duration,
    /// Synthetic activity level reported for components observed on
    /// patrol when no measurement is available
    pub default_activity: f64,
    /// Health score below which a patrolled component is reported as a
    /// health problem
    pub problem_score: f64,
    /// Health score below which a patrolled component is suggested as a
    /// pruning candidate
    pub candidate_score: f64,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            patrol_rate: Duration::from_secs(60),
            default_activity: 0.5,
            problem_score: 0.5,
            candidate_score: 0.3,
        }
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// Capacity and admission limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    /// Maximum live components
    pub max_components: usize,
    /// Whether High/Emergency births may exceed `max_components`
    pub high_priority_bypass: bool,
    /// Maximum chemical releases per source per second
    pub max_release_rate: usize,
    /// Interval of the automatic field tick
    pub field_tick_interval: Duration,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            max_components: 100_000,
            high_priority_bypass: true,
            max_release_rate: 100,
            field_tick_interval: Duration::from_millis(50),
        }
    }
}

// ============================================================================
// TOP-LEVEL CONFIG
// ============================================================================

/// The coordination core's full configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoordinationConfig {
    /// Health scoring thresholds and penalties
    pub health: HealthConfig,
    /// Pruning weights and gates
    pub pruning: PruningConfig,
    /// Patrol cadence and defaults
    pub patrol: PatrolConfig,
    /// Capacity and admission limits
    pub resources: ResourceConfig,
}

impl CoordinationConfig {
    /// Lenient thresholds, long pruning ages, relaxed patrols
    pub fn conservative() -> Self {
        let mut config = Self::default();
        config.health.critical_activity = 0.01;
        config.health.very_low_activity = 0.03;
        config.health.low_activity = 0.10;
        config.health.moderate_activity = 0.20;
        config.health.stale_after = Duration::from_secs(60 * 60);
        config.health.very_stale_after = Duration::from_secs(3 * 60 * 60);
        config.pruning.age_threshold = Duration::from_secs(72 * 60 * 60);
        config.pruning.score_threshold = 0.9;
        config.patrol.patrol_rate = Duration::from_secs(5 * 60);
        config
    }

    /// Strict thresholds, fast pruning, frequent patrols
    pub fn aggressive() -> Self {
        let mut config = Self::default();
        config.health.critical_activity = 0.05;
        config.health.very_low_activity = 0.10;
        config.health.low_activity = 0.25;
        config.health.moderate_activity = 0.40;
        config.health.stale_after = Duration::from_secs(10 * 60);
        config.health.very_stale_after = Duration::from_secs(30 * 60);
        config.pruning.age_threshold = Duration::from_secs(6 * 60 * 60);
        config.pruning.score_threshold = 0.6;
        config.patrol.patrol_rate = Duration::from_secs(15);
        config.patrol.candidate_score = 0.5;
        config
    }
}
