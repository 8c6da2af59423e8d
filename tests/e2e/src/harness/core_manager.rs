//! Test Core Manager
//!
//! Builds isolated `CoordinationCore` instances per test:
//! - Fresh state, nothing shared between tests
//! - Preset or customised configuration
//! - Bulk population helpers for spatial scenarios

use neuropil_core::{
    ComponentRecord, ComponentType, CoordinationConfig, CoordinationCore, Position3D,
};

/// Manager for test cores
///
/// Each instance owns an isolated `CoordinationCore`; dropping the manager
/// drops the core and any state it held.
///
/// # Example
///
/// ```rust,ignore
/// let manager = TestCoreManager::new();
/// manager.register_neuron("n1", 0.0, 0.0, 0.0);
/// let nearby = manager.core.find_nearby(Position3D::ORIGIN, 20.0);
/// ```
pub struct TestCoreManager {
    /// The core under test
    pub core: CoordinationCore,
}

impl Default for TestCoreManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCoreManager {
    /// Core with default (biologically realistic) configuration
    pub fn new() -> Self {
        Self {
            core: CoordinationCore::default(),
        }
    }

    /// Core with a custom configuration
    pub fn with_config(config: CoordinationConfig) -> Self {
        Self {
            core: CoordinationCore::new(config),
        }
    }

    /// Core with a small component budget, for admission tests
    pub fn with_capacity(max_components: usize) -> Self {
        let mut config = CoordinationConfig::default();
        config.resources.max_components = max_components;
        Self::with_config(config)
    }

    /// Register a neuron at a position
    pub fn register_neuron(&self, id: &str, x: f64, y: f64, z: f64) -> ComponentRecord {
        let record = ComponentRecord::new(id, ComponentType::Neuron, Position3D::new(x, y, z));
        self.core
            .register_component(record.clone())
            .expect("register neuron");
        record
    }

    /// Register `count` neurons on a planar grid with the given spacing,
    /// ids `prefix0..prefixN`. Returns the ids.
    pub fn register_neuron_grid(&self, prefix: &str, count: usize, spacing: f64) -> Vec<String> {
        let side = (count as f64).sqrt().ceil() as usize;
        (0..count)
            .map(|i| {
                let id = format!("{prefix}{i}");
                let x = (i % side) as f64 * spacing;
                let y = (i / side) as f64 * spacing;
                self.register_neuron(&id, x, y, 0.0);
                id
            })
            .collect()
    }

    /// Ids returned by a radius query, sorted for stable assertions
    pub fn nearby_ids(&self, center: Position3D, radius: f64) -> Vec<String> {
        let mut ids: Vec<String> = self
            .core
            .find_nearby(center, radius)
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort();
        ids
    }
}
