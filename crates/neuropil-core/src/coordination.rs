//! Coordination Core Facade
//!
//! One wiring point for the three subsystems - registry, chemical field,
//! lifecycle supervisor - exposing the full coordination API. Everything
//! here delegates; the subsystems stay independently usable and testable.
//!
//! Construction is explicit (no singletons) and teardown is `Drop`:
//! dropping the core aborts any background tickers and releases all maps.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::chemical::{
    BindingTarget, ChemicalField, LigandFieldStats, LigandKinetics, LigandType, RateLimiter,
    TickerHandle,
};
use crate::config::CoordinationConfig;
use crate::error::{CoreError, Result};
use crate::lifecycle::{
    BirthPriority, ComponentHealth, LifecycleStats, LifecycleSupervisor, PatrolReport,
    PruningTarget,
};
use crate::plasticity::{PlasticityAdjustment, PlasticityDispatcher, Synapse};
use crate::registry::{
    ComponentRecord, ComponentRegistry, ComponentType, FindCriteria, LoadDiagnostic, Position3D,
    RegistryStats, SynapticRecord, Territory, TerritoryManager,
};

/// Combined occupancy snapshot across all subsystems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinationStats {
    /// Registry occupancy
    pub registry: RegistryStats,
    /// Lifecycle occupancy
    pub lifecycle: LifecycleStats,
    /// Per-ligand field occupancy
    pub fields: HashMap<LigandType, LigandFieldStats>,
}

/// The extracellular coordination core.
///
/// Owns the spatial registry, the chemical diffusion fields, the lifecycle
/// supervisor, and the plasticity dispatcher, wired over shared `Arc`s.
#[derive(Debug)]
pub struct CoordinationCore {
    config: RwLock<CoordinationConfig>,
    registry: Arc<ComponentRegistry>,
    territory: TerritoryManager,
    field: Arc<ChemicalField>,
    lifecycle: LifecycleSupervisor,
    plasticity: PlasticityDispatcher,
}

impl Default for CoordinationCore {
    fn default() -> Self {
        Self::new(CoordinationConfig::default())
    }
}

impl CoordinationCore {
    /// Build a core with the given configuration
    pub fn new(config: CoordinationConfig) -> Self {
        let registry = Arc::new(ComponentRegistry::new());
        let territory = TerritoryManager::new(Arc::clone(&registry));
        let field = Arc::new(ChemicalField::new(RateLimiter::new(
            config.resources.max_release_rate,
        )));
        let lifecycle = LifecycleSupervisor::new(Arc::clone(&registry), &config);
        let plasticity = PlasticityDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&lifecycle.health),
            Arc::clone(&field),
        );
        Self {
            config: RwLock::new(config),
            registry,
            territory,
            field,
            lifecycle,
            plasticity,
        }
    }

    // ------------------------------------------------------------------
    // Subsystem access
    // ------------------------------------------------------------------

    /// The shared component registry
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// The chemical diffusion field
    pub fn field(&self) -> &Arc<ChemicalField> {
        &self.field
    }

    /// The lifecycle supervisor
    pub fn lifecycle(&self) -> &LifecycleSupervisor {
        &self.lifecycle
    }

    /// The territory manager
    pub fn territory(&self) -> &TerritoryManager {
        &self.territory
    }

    /// The plasticity dispatcher
    pub fn plasticity(&self) -> &PlasticityDispatcher {
        &self.plasticity
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Current configuration snapshot
    pub fn config(&self) -> CoordinationConfig {
        self.config.read().clone()
    }

    /// Swap the configuration; takes effect for subsequent calls
    pub fn update_config(&self, config: CoordinationConfig) {
        self.lifecycle.set_config(&config);
        self.field.set_release_limit(config.resources.max_release_rate);
        *self.config.write() = config;
    }

    // ------------------------------------------------------------------
    // Components & connectivity
    // ------------------------------------------------------------------

    /// Register a component (idempotent replacement)
    pub fn register_component(&self, record: ComponentRecord) -> Result<()> {
        self.registry.register(record)
    }

    /// Unregister a component; a miss is silent
    pub fn unregister_component(&self, id: &str) {
        self.remove_component(id);
    }

    /// Strictly create a component against the resource budget
    pub fn create_component(&self, record: ComponentRecord) -> Result<()> {
        let max = self.config.read().resources.max_components;
        self.registry.register_strict(record, max)
    }

    /// Remove a component and every lifecycle artifact referencing it.
    /// Returns whether the component was registered.
    pub fn remove_component(&self, id: &str) -> bool {
        let removed = self.lifecycle.remove_component(id);
        self.field.unregister_target(id);
        removed
    }

    /// Snapshot of a component record
    pub fn get_component(&self, id: &str) -> Option<ComponentRecord> {
        self.registry.get(id)
    }

    /// Number of live components
    pub fn component_count(&self) -> usize {
        self.registry.count()
    }

    /// Combined type/state/spatial search
    pub fn find(&self, criteria: &FindCriteria) -> Vec<ComponentRecord> {
        self.registry.find(criteria)
    }

    /// All components within `radius` of `center`
    pub fn find_nearby(&self, center: Position3D, radius: f64) -> Vec<ComponentRecord> {
        self.registry.find_nearby(center, radius)
    }

    /// All components of one type
    pub fn find_by_type(&self, component_type: ComponentType) -> Vec<ComponentRecord> {
        self.registry.find_by_type(component_type)
    }

    /// Create a directed connectivity edge
    pub fn map_connection(&self, from: &str, to: &str) -> Result<()> {
        self.registry.map_connection(from, to)
    }

    /// Outgoing edge targets for a component
    pub fn get_connections(&self, id: &str) -> Vec<String> {
        self.registry.get_connections(id)
    }

    /// Update a component's activity state
    pub fn update_component_state(
        &self,
        id: &str,
        state: crate::registry::ComponentState,
    ) -> Result<()> {
        self.registry.update_state(id, state)
    }

    /// Euclidean distance between two registered components
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        self.registry.distance(a, b)
    }

    /// Record synaptic activity (creates the pre -> post edge)
    pub fn record_synaptic_activity(
        &self,
        synapse_id: &str,
        pre_id: &str,
        post_id: &str,
        strength: f64,
    ) -> Result<()> {
        self.registry
            .record_synapse(synapse_id, pre_id, post_id, strength)
    }

    /// Snapshot of a synaptic record
    pub fn get_synaptic_info(&self, synapse_id: &str) -> Option<SynapticRecord> {
        self.registry.get_synapse(synapse_id)
    }

    // ------------------------------------------------------------------
    // Territories
    // ------------------------------------------------------------------

    /// Establish (or overwrite) an astrocyte territory
    pub fn establish_territory(
        &self,
        astrocyte_id: &str,
        center: Position3D,
        radius: f64,
    ) -> Result<()> {
        self.territory.establish(astrocyte_id, center, radius)
    }

    /// Snapshot of a territory
    pub fn get_territory(&self, astrocyte_id: &str) -> Option<Territory> {
        self.territory.get(astrocyte_id)
    }

    /// Validate a territory's neuron load, shrinking it when over budget
    pub fn validate_astrocyte_load(
        &self,
        astrocyte_id: &str,
        max_neurons: usize,
    ) -> Result<LoadDiagnostic> {
        self.territory.validate_load(astrocyte_id, max_neurons)
    }

    // ------------------------------------------------------------------
    // Chemical signalling
    // ------------------------------------------------------------------

    /// Release ligand from a source at an explicit origin
    pub fn release_chemical(
        &self,
        ligand: LigandType,
        source_id: &str,
        origin: Position3D,
        amount: f64,
    ) -> Result<()> {
        self.field.release(ligand, source_id, origin, amount)
    }

    /// Release ligand from a registered component, resolving its position
    pub fn release_chemical_from(
        &self,
        ligand: LigandType,
        source_id: &str,
        amount: f64,
    ) -> Result<()> {
        let source = self
            .registry
            .get(source_id)
            .ok_or_else(|| CoreError::UnknownComponent(source_id.to_string()))?;
        self.field.release(ligand, source_id, source.position, amount)
    }

    /// Concentration of a ligand at a position (uM)
    pub fn get_concentration(&self, ligand: LigandType, position: Position3D) -> f64 {
        self.field.get_concentration(ligand, position)
    }

    /// Register a receptor-bearing binding target
    pub fn register_binding_target(&self, target: Arc<dyn BindingTarget>) {
        self.field.register_target(target);
    }

    /// Replace a ligand's kinetics
    pub fn set_kinetics(&self, ligand: LigandType, kinetics: LigandKinetics) {
        self.field.set_kinetics(ligand, kinetics);
    }

    /// Advance all fields by `dt` seconds (deterministic test path)
    pub fn tick_fields(&self, dt: f64) {
        self.field.tick(dt);
    }

    /// Start the automatic per-ligand tick tasks at the configured
    /// interval. Requires a running tokio runtime; drop the handle to stop.
    pub fn start_field_tickers(&self) -> TickerHandle {
        let interval = self.config.read().resources.field_tick_interval;
        self.field.spawn_tickers(interval)
    }

    /// Start the automatic tick tasks at a custom interval
    pub fn start_field_tickers_at(&self, interval: Duration) -> TickerHandle {
        self.field.spawn_tickers(interval)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Queue a birth request; returns the request id
    pub fn request_birth(
        &self,
        component_type: ComponentType,
        position: Position3D,
        justification: impl Into<String>,
        priority: BirthPriority,
        requested_by: impl Into<String>,
    ) -> String {
        self.lifecycle
            .birth
            .request(component_type, position, justification, priority, requested_by)
    }

    /// Process pending birth requests; returns the created records
    pub fn process_births(&self) -> Vec<ComponentRecord> {
        self.lifecycle.birth.process()
    }

    /// Mark a connection as a pruning candidate
    pub fn mark_for_pruning(
        &self,
        connection_id: &str,
        source_id: &str,
        target_id: &str,
        activity_level: f64,
    ) -> PruningTarget {
        self.lifecycle
            .pruning
            .mark(connection_id, source_id, target_id, activity_level)
    }

    /// Execute pruning and dispatch the results: pruned connection ids
    /// have their synaptic records removed from the registry and their
    /// collaborators dropped from the dispatcher.
    pub fn execute_pruning(&self) -> Vec<String> {
        let pruned = self.lifecycle.pruning.execute();
        for connection_id in &pruned {
            self.registry.remove_synapse(connection_id);
            self.plasticity.unregister_synapse(connection_id);
        }
        pruned
    }

    /// Snapshot of pending pruning targets
    pub fn get_pruning_candidates(&self) -> Vec<PruningTarget> {
        self.lifecycle.pruning.candidates()
    }

    /// Record a health observation for a component
    pub fn update_component_health(
        &self,
        id: &str,
        activity_level: f64,
        connection_count: usize,
    ) -> ComponentHealth {
        self.lifecycle.health.update(id, activity_level, connection_count)
    }

    /// Snapshot of a component's health record
    pub fn get_component_health(&self, id: &str) -> Option<ComponentHealth> {
        self.lifecycle.health.get(id)
    }

    /// Establish (or overwrite) a patrol route
    pub fn establish_patrol_route(
        &self,
        microglia_id: &str,
        center: Position3D,
        radius: f64,
        patrol_rate: Option<Duration>,
    ) -> Result<()> {
        self.lifecycle
            .patrol
            .establish_route(microglia_id, center, radius, patrol_rate)
    }

    /// Execute one patrol sweep for a microglia
    pub fn execute_patrol(&self, microglia_id: &str) -> Result<PatrolReport> {
        self.lifecycle.patrol.execute_patrol(microglia_id)
    }

    // ------------------------------------------------------------------
    // Plasticity
    // ------------------------------------------------------------------

    /// Register a synapse collaborator under its id
    pub fn register_synapse(&self, synapse_id: &str, synapse: Arc<dyn Synapse>) -> Result<()> {
        self.plasticity.register_synapse(synapse_id, synapse)
    }

    /// Set a synapse's weight; returns the applied change
    pub fn set_synapse_weight(&self, synapse_id: &str, weight: f64) -> Result<f64> {
        self.plasticity.set_synapse_weight(synapse_id, weight)
    }

    /// Apply a plasticity adjustment; returns the observed change
    pub fn apply_plasticity(
        &self,
        synapse_id: &str,
        adjustment: PlasticityAdjustment,
    ) -> Result<f64> {
        self.plasticity.apply_plasticity(synapse_id, adjustment)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Combined occupancy snapshot
    pub fn stats(&self) -> CoordinationStats {
        CoordinationStats {
            registry: self.registry.stats(),
            lifecycle: self.lifecycle.stats(),
            fields: self.field.stats(),
        }
    }
}
