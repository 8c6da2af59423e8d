//! Lifecycle Supervisor
//!
//! Groups the microglial subsystems - health, pruning, birth, patrol -
//! behind one wiring point. Collaborators are injected explicitly at
//! construction; nothing here reaches for a singleton, and health and
//! pruning hold only ids and snapshots, never references back into the
//! registry's records.

use std::sync::Arc;

use crate::config::CoordinationConfig;
use crate::registry::ComponentRegistry;

use super::birth::BirthQueue;
use super::health::HealthMonitor;
use super::patrol::PatrolScheduler;
use super::pruning::PruningEngine;

/// Occupancy snapshot across the lifecycle subsystems
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleStats {
    /// Components with health records
    pub tracked_health_records: usize,
    /// Pending pruning targets
    pub pending_pruning_targets: usize,
    /// Pending birth requests
    pub pending_birth_requests: usize,
    /// Standing patrol routes
    pub patrol_routes: usize,
}

/// The gated factory and surveillance coordinator for component lifecycle.
#[derive(Debug)]
pub struct LifecycleSupervisor {
    registry: Arc<ComponentRegistry>,
    /// Health scoring and issue detection
    pub health: Arc<HealthMonitor>,
    /// Mark/score/execute connection pruning
    pub pruning: Arc<PruningEngine>,
    /// Priority-gated component creation
    pub birth: Arc<BirthQueue>,
    /// Territorial surveillance
    pub patrol: Arc<PatrolScheduler>,
}

impl LifecycleSupervisor {
    /// Wire the four subsystems over a shared registry
    pub fn new(registry: Arc<ComponentRegistry>, config: &CoordinationConfig) -> Self {
        let health = Arc::new(HealthMonitor::new(config.health.clone()));
        let pruning = Arc::new(PruningEngine::new(
            Arc::clone(&registry),
            Arc::clone(&health),
            config.pruning.clone(),
        ));
        let birth = Arc::new(BirthQueue::new(
            Arc::clone(&registry),
            config.resources.clone(),
        ));
        let patrol = Arc::new(PatrolScheduler::new(
            Arc::clone(&registry),
            Arc::clone(&health),
            config.patrol.clone(),
        ));
        Self {
            registry,
            health,
            pruning,
            birth,
            patrol,
        }
    }

    /// Push a new configuration into every subsystem
    pub fn set_config(&self, config: &CoordinationConfig) {
        self.health.set_config(config.health.clone());
        self.pruning.set_config(config.pruning.clone());
        self.birth.set_config(config.resources.clone());
        self.patrol.set_config(config.patrol.clone());
    }

    /// Remove a component and every lifecycle artifact referring to it:
    /// the registry record (with its edges and synapses), the health
    /// entry, pruning targets on its connections, and its patrol route.
    ///
    /// Returns whether the component was registered; a miss is silent.
    pub fn remove_component(&self, id: &str) -> bool {
        let removed = self.registry.unregister(id);
        self.health.remove(id);
        self.pruning.remove_for_component(id);
        self.patrol.remove_route(id);
        removed
    }

    /// Occupancy snapshot
    pub fn stats(&self) -> LifecycleStats {
        LifecycleStats {
            tracked_health_records: self.health.tracked_count(),
            pending_pruning_targets: self.pruning.pending_count(),
            pending_birth_requests: self.birth.pending_count(),
            patrol_routes: self.patrol.route_count(),
        }
    }
}
