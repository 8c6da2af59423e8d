//! Plasticity Dispatch
//!
//! The bridge between neurons requesting weight changes and the synapse
//! collaborators that own the weights. The dispatcher validates
//! adjustments, computes STDP changes, delegates to the synapse, and
//! reports the outcome to the registry (synaptic activity record) and
//! health monitor. Significant changes additionally release a calcium-like
//! signal through the chemical field, modelling the intracellular
//! signalling cascade that accompanies plasticity.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::chemical::{ChemicalField, LigandType};
use crate::error::{CoreError, Result};
use crate::lifecycle::HealthMonitor;
use crate::registry::{ComponentRegistry, Position3D};

use super::stdp::{MAX_DELTA_T_MS, MAX_LEARNING_RATE, stdp_weight_change};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Weight changes above this magnitude trigger calcium signalling
pub const SIGNIFICANT_WEIGHT_CHANGE: f64 = 0.01;

/// Calcium released per unit of significant weight change
pub const CALCIUM_SIGNAL_GAIN: f64 = 10.0;

// ============================================================================
// COLLABORATOR INTERFACE
// ============================================================================

/// Per-synapse plasticity parameters reported by the collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlasticityConfig {
    /// Collaborator's intrinsic learning rate
    pub learning_rate: f64,
    /// Lower weight bound enforced by the collaborator
    pub min_weight: f64,
    /// Upper weight bound enforced by the collaborator
    pub max_weight: f64,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            min_weight: 0.0,
            max_weight: 10.0,
        }
    }
}

/// A synapse collaborator owning transmission state.
///
/// Implementations live outside the core (the synapse model, plugins);
/// the dispatcher only drives this interface.
pub trait Synapse: Send + Sync {
    /// Current transmission weight
    fn get_weight(&self) -> f64;
    /// Set the transmission weight directly
    fn set_weight(&self, weight: f64);
    /// Apply a computed plasticity event
    fn update_weight(&self, event: PlasticityEvent);
    /// Pre-synaptic component id
    fn get_pre_id(&self) -> String;
    /// Post-synaptic component id
    fn get_post_id(&self) -> String;
    /// The collaborator's plasticity parameters
    fn get_plasticity_config(&self) -> PlasticityConfig;
}

// ============================================================================
// EVENTS & ADJUSTMENTS
// ============================================================================

/// How a weight change was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlasticityEventKind {
    /// Computed from a spike-timing difference
    Stdp,
    /// Caller-supplied direct change
    Direct,
}

/// A plasticity event dispatched to a synapse collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlasticityEvent {
    /// Derivation of the change
    pub kind: PlasticityEventKind,
    /// Signed weight change to apply
    pub weight_change: f64,
    /// When the event was dispatched
    pub timestamp: DateTime<Utc>,
}

/// A requested plasticity adjustment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PlasticityAdjustment {
    /// STDP: derive the change from a spike-timing difference
    Stdp {
        /// Post-spike minus pre-spike time (ms); |value| <= 200
        delta_t_ms: f64,
        /// Learning rate in [0, 0.1]
        learning_rate: f64,
    },
    /// Pass a weight change through unmodified
    Direct {
        /// Signed weight change
        weight_change: f64,
    },
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Routes weight and STDP events to synapse collaborators and reports the
/// outcomes to the rest of the core.
pub struct PlasticityDispatcher {
    registry: Arc<ComponentRegistry>,
    health: Arc<HealthMonitor>,
    field: Arc<ChemicalField>,
    synapses: RwLock<HashMap<String, Arc<dyn Synapse>>>,
}

impl std::fmt::Debug for PlasticityDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlasticityDispatcher")
            .field("synapses", &self.synapses.read().len())
            .finish()
    }
}

impl PlasticityDispatcher {
    /// Create a dispatcher over the shared collaborators
    pub fn new(
        registry: Arc<ComponentRegistry>,
        health: Arc<HealthMonitor>,
        field: Arc<ChemicalField>,
    ) -> Self {
        Self {
            registry,
            health,
            field,
            synapses: RwLock::new(HashMap::new()),
        }
    }

    /// Register a synapse collaborator under its id
    pub fn register_synapse(&self, synapse_id: &str, synapse: Arc<dyn Synapse>) -> Result<()> {
        if synapse_id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        self.synapses
            .write()
            .insert(synapse_id.to_string(), synapse);
        Ok(())
    }

    /// Remove a synapse collaborator
    pub fn unregister_synapse(&self, synapse_id: &str) -> bool {
        self.synapses.write().remove(synapse_id).is_some()
    }

    /// Number of registered collaborators
    pub fn synapse_count(&self) -> usize {
        self.synapses.read().len()
    }

    fn lookup(&self, synapse_id: &str) -> Result<Arc<dyn Synapse>> {
        self.synapses
            .read()
            .get(synapse_id)
            .map(Arc::clone)
            .ok_or_else(|| CoreError::UnknownSynapse(synapse_id.to_string()))
    }

    /// Set a synapse's weight directly.
    ///
    /// Validates the weight, delegates to the collaborator, records the
    /// activity in the registry, refreshes the pre-synaptic component's
    /// health observation, and releases calcium for significant changes.
    /// Returns the applied weight change.
    pub fn set_synapse_weight(&self, synapse_id: &str, weight: f64) -> Result<f64> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(CoreError::InvalidAdjustment(format!(
                "weight must be finite and non-negative, got {weight}"
            )));
        }
        let synapse = self.lookup(synapse_id)?;
        let pre_id = synapse.get_pre_id();
        let post_id = synapse.get_post_id();
        // Validate endpoints before mutating anything
        if !self.registry.contains(&pre_id) {
            return Err(CoreError::UnknownComponent(pre_id));
        }
        if !self.registry.contains(&post_id) {
            return Err(CoreError::UnknownComponent(post_id));
        }

        let before = synapse.get_weight();
        synapse.set_weight(weight);
        let applied = synapse.get_weight() - before;

        self.report(synapse_id, &pre_id, &post_id, synapse.get_weight(), applied)?;
        Ok(applied)
    }

    /// Apply a plasticity adjustment.
    ///
    /// STDP adjustments are validated (|delta t| <= 200 ms, learning rate
    /// in [0, 0.1]) and converted through the asymmetric exponential
    /// window; direct adjustments pass their weight change through. The
    /// resulting event is dispatched to the collaborator and the observed
    /// weight change reported onward. Returns the observed change.
    pub fn apply_plasticity(
        &self,
        synapse_id: &str,
        adjustment: PlasticityAdjustment,
    ) -> Result<f64> {
        let weight_change = match adjustment {
            PlasticityAdjustment::Stdp {
                delta_t_ms,
                learning_rate,
            } => {
                if !delta_t_ms.is_finite() || delta_t_ms.abs() > MAX_DELTA_T_MS {
                    return Err(CoreError::InvalidAdjustment(format!(
                        "spike timing difference {delta_t_ms} ms outside +/-{MAX_DELTA_T_MS} ms"
                    )));
                }
                if !learning_rate.is_finite()
                    || !(0.0..=MAX_LEARNING_RATE).contains(&learning_rate)
                {
                    return Err(CoreError::InvalidAdjustment(format!(
                        "learning rate {learning_rate} outside [0, {MAX_LEARNING_RATE}]"
                    )));
                }
                stdp_weight_change(delta_t_ms, learning_rate)
            }
            PlasticityAdjustment::Direct { weight_change } => {
                if !weight_change.is_finite() {
                    return Err(CoreError::InvalidAdjustment(
                        "weight change must be finite".to_string(),
                    ));
                }
                weight_change
            }
        };

        let synapse = self.lookup(synapse_id)?;
        let pre_id = synapse.get_pre_id();
        let post_id = synapse.get_post_id();
        if !self.registry.contains(&pre_id) {
            return Err(CoreError::UnknownComponent(pre_id));
        }
        if !self.registry.contains(&post_id) {
            return Err(CoreError::UnknownComponent(post_id));
        }

        let kind = match adjustment {
            PlasticityAdjustment::Stdp { .. } => PlasticityEventKind::Stdp,
            PlasticityAdjustment::Direct { .. } => PlasticityEventKind::Direct,
        };
        let before = synapse.get_weight();
        synapse.update_weight(PlasticityEvent {
            kind,
            weight_change,
            timestamp: Utc::now(),
        });
        let applied = synapse.get_weight() - before;

        self.report(synapse_id, &pre_id, &post_id, synapse.get_weight(), applied)?;
        Ok(applied)
    }

    /// Report an applied change to the registry and health monitor, and
    /// release calcium when the change was significant. Calcium release is
    /// best-effort: a rate-limited source drops the signal, not the call.
    fn report(
        &self,
        synapse_id: &str,
        pre_id: &str,
        post_id: &str,
        new_weight: f64,
        applied: f64,
    ) -> Result<()> {
        self.registry
            .record_synapse(synapse_id, pre_id, post_id, new_weight)?;
        self.health.update(
            pre_id,
            applied.abs().clamp(0.0, 1.0),
            self.registry.connection_count(pre_id),
        );

        if applied.abs() > SIGNIFICANT_WEIGHT_CHANGE {
            let origin = self.synapse_midpoint(pre_id, post_id);
            if let Err(err) = self.field.release(
                LigandType::Calcium,
                synapse_id,
                origin,
                CALCIUM_SIGNAL_GAIN * applied.abs(),
            ) {
                tracing::debug!(synapse_id, error = %err, "calcium signal dropped");
            }
        }
        Ok(())
    }

    /// Midpoint between the synapse's endpoints, the release origin for
    /// its calcium signalling
    fn synapse_midpoint(&self, pre_id: &str, post_id: &str) -> Position3D {
        match (self.registry.get(pre_id), self.registry.get(post_id)) {
            (Some(pre), Some(post)) => Position3D::new(
                (pre.position.x + post.position.x) / 2.0,
                (pre.position.y + post.position.y) / 2.0,
                (pre.position.z + post.position.z) / 2.0,
            ),
            (Some(only), None) | (None, Some(only)) => only.position,
            (None, None) => Position3D::ORIGIN,
        }
    }
}
