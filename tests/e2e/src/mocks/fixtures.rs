//! Collaborator Doubles
//!
//! The core drives the `Synapse` and `BindingTarget` interfaces but never
//! implements them; these doubles stand in for the neuron/synapse models:
//! - `MockSynapse`: weight cell plus an event log
//! - `RecordingBindingTarget`: receptor set plus a delivery log

use parking_lot::Mutex;
use std::sync::Arc;

use neuropil_core::{LigandType, PlasticityConfig, PlasticityEvent, Synapse};

// ============================================================================
// SYNAPSE DOUBLE
// ============================================================================

/// A synapse collaborator that records every event it is asked to apply.
pub struct MockSynapse {
    weight: Mutex<f64>,
    events: Mutex<Vec<PlasticityEvent>>,
    pre_id: String,
    post_id: String,
}

impl MockSynapse {
    /// Create a double wired between two component ids
    pub fn new(pre_id: &str, post_id: &str, weight: f64) -> Arc<Self> {
        Arc::new(Self {
            weight: Mutex::new(weight),
            events: Mutex::new(Vec::new()),
            pre_id: pre_id.to_string(),
            post_id: post_id.to_string(),
        })
    }

    /// Events applied so far
    pub fn events(&self) -> Vec<PlasticityEvent> {
        self.events.lock().clone()
    }
}

impl Synapse for MockSynapse {
    fn get_weight(&self) -> f64 {
        *self.weight.lock()
    }

    fn set_weight(&self, weight: f64) {
        *self.weight.lock() = weight;
    }

    fn update_weight(&self, event: PlasticityEvent) {
        let mut weight = self.weight.lock();
        *weight = (*weight + event.weight_change).max(0.0);
        self.events.lock().push(event);
    }

    fn get_pre_id(&self) -> String {
        self.pre_id.clone()
    }

    fn get_post_id(&self) -> String {
        self.post_id.clone()
    }

    fn get_plasticity_config(&self) -> PlasticityConfig {
        PlasticityConfig::default()
    }
}

// ============================================================================
// BINDING TARGET DOUBLE
// ============================================================================

/// One recorded ligand delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Species delivered
    pub ligand: LigandType,
    /// Source that released
    pub source_id: String,
    /// Delivered concentration (affinity-scaled)
    pub concentration: f64,
}

/// A binding target that records every delivery it receives.
pub struct RecordingBindingTarget {
    id: String,
    receptors: Vec<LigandType>,
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingBindingTarget {
    /// Create a target with the given receptor set
    pub fn new(id: &str, receptors: Vec<LigandType>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            receptors,
            deliveries: Mutex::new(Vec::new()),
        })
    }

    /// Deliveries received so far
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// Number of deliveries received
    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().len()
    }
}

impl neuropil_core::BindingTarget for RecordingBindingTarget {
    fn id(&self) -> &str {
        &self.id
    }

    fn receptors(&self) -> Vec<LigandType> {
        self.receptors.clone()
    }

    fn on_bind(&self, ligand: LigandType, source_id: &str, concentration: f64) {
        self.deliveries.lock().push(Delivery {
            ligand,
            source_id: source_id.to_string(),
            concentration,
        });
    }
}
