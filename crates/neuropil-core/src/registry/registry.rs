//! Component Registry
//!
//! Identity, state, connectivity, and synaptic bookkeeping for every live
//! component, wrapped around the spatial grid. One read-write lock guards
//! the four maps; the grid carries its own locks and is only touched while
//! the registry lock is held exclusively inside `register` and `unregister`,
//! the two paths that must mutate both sides atomically.
//!
//! After every completed public call:
//!
//! - every connectivity edge endpoint exists in the registry
//! - every synaptic record's (pre, post) pair appears as an edge
//! - the grid indexes exactly the set of registered components

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{CoreError, Result};

use super::grid::SpatialGrid;
use super::types::{
    ComponentRecord, ComponentType, FindCriteria, Position3D, SynapticRecord, Territory,
};

// ============================================================================
// REGISTRY STATE
// ============================================================================

#[derive(Debug, Default)]
struct RegistryInner {
    /// id -> owned record
    records: HashMap<String, ComponentRecord>,
    /// id -> outgoing edge targets (no duplicates per pair)
    connections: HashMap<String, Vec<String>>,
    /// synapse id -> activity record
    synapses: HashMap<String, SynapticRecord>,
    /// astrocyte id -> territory
    territories: HashMap<String, Territory>,
}

/// Snapshot of registry occupancy
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    /// Live components
    pub component_count: usize,
    /// Directed connectivity edges
    pub connection_count: usize,
    /// Synaptic activity records
    pub synapse_count: usize,
    /// Established territories
    pub territory_count: usize,
    /// Occupied grid cells
    pub grid_cell_count: usize,
}

// ============================================================================
// COMPONENT REGISTRY
// ============================================================================

/// Concurrent registry of simulation components.
///
/// Consumers receive cloned snapshots; the registry retains exclusive
/// ownership of the stored records.
#[derive(Debug)]
pub struct ComponentRegistry {
    grid: SpatialGrid,
    inner: RwLock<RegistryInner>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Create a registry with the default grid cell size
    pub fn new() -> Self {
        Self::with_cell_size(super::grid::DEFAULT_CELL_SIZE)
    }

    /// Create a registry with a custom grid cell size (um)
    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            grid: SpatialGrid::new(cell_size),
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a component, replacing any existing record with the same id.
    ///
    /// An unset (epoch) `registered_at` is stamped with the current time.
    /// Replacement migrates the grid entry when the position changed.
    pub fn register(&self, mut record: ComponentRecord) -> Result<()> {
        if record.id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        if record.registered_at == ComponentRecord::unset_timestamp() {
            record.registered_at = Utc::now();
        }

        let mut inner = self.inner.write();
        if let Some(previous) = inner.records.get(&record.id) {
            self.grid.remove(&record.id, &previous.position);
        }
        self.grid.insert(&record.id, record.position);
        inner.connections.entry(record.id.clone()).or_default();
        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Register a component only if capacity allows.
    ///
    /// The count check happens under the same write lock as the insertion,
    /// so concurrent admission paths cannot oversubscribe. Replacement of an
    /// existing id never counts against capacity.
    pub fn register_bounded(&self, mut record: ComponentRecord, max_components: usize) -> Result<()> {
        if record.id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        if record.registered_at == ComponentRecord::unset_timestamp() {
            record.registered_at = Utc::now();
        }

        let mut inner = self.inner.write();
        let replacing = inner.records.contains_key(&record.id);
        if !replacing && inner.records.len() >= max_components {
            return Err(CoreError::ResourceExhausted {
                current: inner.records.len(),
                max: max_components,
            });
        }
        if let Some(previous) = inner.records.get(&record.id) {
            self.grid.remove(&record.id, &previous.position);
        }
        self.grid.insert(&record.id, record.position);
        inner.connections.entry(record.id.clone()).or_default();
        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Strictly create a component: fails with `DuplicateId` when the id is
    /// taken and `ResourceExhausted` at capacity, both checked under the
    /// same write lock as the insertion.
    pub fn register_strict(&self, mut record: ComponentRecord, max_components: usize) -> Result<()> {
        if record.id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        if record.registered_at == ComponentRecord::unset_timestamp() {
            record.registered_at = Utc::now();
        }

        let mut inner = self.inner.write();
        if inner.records.contains_key(&record.id) {
            return Err(CoreError::DuplicateId(record.id));
        }
        if inner.records.len() >= max_components {
            return Err(CoreError::ResourceExhausted {
                current: inner.records.len(),
                max: max_components,
            });
        }
        self.grid.insert(&record.id, record.position);
        inner.connections.entry(record.id.clone()).or_default();
        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Remove a component and everything referencing it: the grid entry,
    /// outgoing and incoming edges, synaptic records where it is pre or
    /// post, and its territory if it was an astrocyte.
    ///
    /// Returns whether the id was registered. A miss is silent.
    pub fn unregister(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(record) = inner.records.remove(id) else {
            return false;
        };
        self.grid.remove(id, &record.position);

        inner.connections.remove(id);
        for targets in inner.connections.values_mut() {
            targets.retain(|t| t != id);
        }
        inner
            .synapses
            .retain(|_, s| s.pre_id != id && s.post_id != id);
        inner.territories.remove(id);
        for territory in inner.territories.values_mut() {
            territory.monitored_ids.retain(|m| m != id);
        }
        true
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Snapshot of a component record
    pub fn get(&self, id: &str) -> Option<ComponentRecord> {
        self.inner.read().records.get(id).cloned()
    }

    /// Whether an id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().records.contains_key(id)
    }

    /// Number of live components
    pub fn count(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Update a component's activity state
    pub fn update_state(&self, id: &str, state: super::types::ComponentState) -> Result<()> {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::UnknownComponent(id.to_string()))?;
        record.state = state;
        Ok(())
    }

    /// Euclidean distance between two registered components
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        let inner = self.inner.read();
        let pa = inner.records.get(a)?.position;
        let pb = inner.records.get(b)?.position;
        Some(pa.distance_to(&pb))
    }

    // ------------------------------------------------------------------
    // Connectivity
    // ------------------------------------------------------------------

    /// Create a directed edge. Both endpoints must exist; duplicate edges
    /// are silently ignored.
    pub fn map_connection(&self, from: &str, to: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.records.contains_key(from) {
            return Err(CoreError::UnknownComponent(from.to_string()));
        }
        if !inner.records.contains_key(to) {
            return Err(CoreError::UnknownComponent(to.to_string()));
        }
        let targets = inner.connections.entry(from.to_string()).or_default();
        if !targets.iter().any(|t| t == to) {
            targets.push(to.to_string());
        }
        Ok(())
    }

    /// Outgoing edge targets for a component (empty when unknown)
    pub fn get_connections(&self, id: &str) -> Vec<String> {
        self.inner
            .read()
            .connections
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of outgoing edges for a component
    pub fn connection_count(&self, id: &str) -> usize {
        self.inner
            .read()
            .connections
            .get(id)
            .map(|t| t.len())
            .unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Synapses
    // ------------------------------------------------------------------

    /// Create or update a synaptic activity record.
    ///
    /// Strength keeps the newest value; `activity_count` starts at 1 and
    /// increments on update. The pre -> post edge is ensured in the same
    /// critical section.
    pub fn record_synapse(
        &self,
        synapse_id: &str,
        pre_id: &str,
        post_id: &str,
        strength: f64,
    ) -> Result<()> {
        if synapse_id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        let strength = if strength.is_finite() && strength >= 0.0 {
            strength
        } else {
            tracing::warn!(synapse_id, strength, "non-finite synaptic strength, storing 0");
            0.0
        };

        let mut inner = self.inner.write();
        if !inner.records.contains_key(pre_id) {
            return Err(CoreError::UnknownComponent(pre_id.to_string()));
        }
        if !inner.records.contains_key(post_id) {
            return Err(CoreError::UnknownComponent(post_id.to_string()));
        }

        let now = Utc::now();
        match inner.synapses.get_mut(synapse_id) {
            Some(existing) => {
                existing.strength = strength;
                existing.last_activity = now;
                existing.activity_count += 1;
                existing.pre_id = pre_id.to_string();
                existing.post_id = post_id.to_string();
            }
            None => {
                inner.synapses.insert(
                    synapse_id.to_string(),
                    SynapticRecord {
                        synapse_id: synapse_id.to_string(),
                        pre_id: pre_id.to_string(),
                        post_id: post_id.to_string(),
                        strength,
                        last_activity: now,
                        activity_count: 1,
                    },
                );
            }
        }

        let targets = inner.connections.entry(pre_id.to_string()).or_default();
        if !targets.iter().any(|t| t == post_id) {
            targets.push(post_id.to_string());
        }
        Ok(())
    }

    /// Snapshot of a synaptic record
    pub fn get_synapse(&self, synapse_id: &str) -> Option<SynapticRecord> {
        self.inner.read().synapses.get(synapse_id).cloned()
    }

    /// Remove a synaptic record, and its pre -> post edge when no other
    /// synapse still uses that pair. Returns whether the record existed.
    pub fn remove_synapse(&self, synapse_id: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(removed) = inner.synapses.remove(synapse_id) else {
            return false;
        };
        let pair_still_used = inner
            .synapses
            .values()
            .any(|s| s.pre_id == removed.pre_id && s.post_id == removed.post_id);
        if !pair_still_used {
            if let Some(targets) = inner.connections.get_mut(&removed.pre_id) {
                targets.retain(|t| *t != removed.post_id);
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Territories
    // ------------------------------------------------------------------

    /// Store a territory, replacing any prior one for the astrocyte
    pub fn set_territory(&self, territory: Territory) {
        self.inner
            .write()
            .territories
            .insert(territory.astrocyte_id.clone(), territory);
    }

    /// Snapshot of an astrocyte's territory
    pub fn get_territory(&self, astrocyte_id: &str) -> Option<Territory> {
        self.inner.read().territories.get(astrocyte_id).cloned()
    }

    /// Mutate a territory in place under the write lock.
    /// Returns false when no territory exists for the id.
    pub fn update_territory<F>(&self, astrocyte_id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Territory),
    {
        let mut inner = self.inner.write();
        match inner.territories.get_mut(astrocyte_id) {
            Some(territory) => {
                apply(territory);
                territory.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Combined type/state/spatial search.
    ///
    /// A positive radius dispatches to the grid; radius 0 with a position is
    /// an exact (bitwise) match; a negative radius means no spatial filter.
    /// The grid query runs before the registry read lock is taken.
    pub fn find(&self, criteria: &FindCriteria) -> Vec<ComponentRecord> {
        let radius = criteria.radius.unwrap_or(-1.0);
        let spatial_ids: Option<Vec<String>> = match (&criteria.position, radius) {
            (Some(center), r) if r > 0.0 => Some(
                self.grid
                    .query_radius(center, r)
                    .into_iter()
                    .map(|(id, _)| id)
                    .collect(),
            ),
            _ => None,
        };

        let inner = self.inner.read();
        let matches = |record: &ComponentRecord| -> bool {
            if let Some(t) = criteria.component_type {
                if record.component_type != t {
                    return false;
                }
            }
            if let Some(s) = criteria.state {
                if record.state != s {
                    return false;
                }
            }
            if radius == 0.0 {
                if let Some(center) = &criteria.position {
                    return record.position.bitwise_eq(center);
                }
            }
            true
        };

        match spatial_ids {
            Some(ids) => ids
                .into_iter()
                .filter_map(|id| inner.records.get(&id))
                .filter(|r| matches(r))
                .cloned()
                .collect(),
            None => inner
                .records
                .values()
                .filter(|r| matches(r))
                .cloned()
                .collect(),
        }
    }

    /// All components within `radius` of `center`
    pub fn find_nearby(&self, center: Position3D, radius: f64) -> Vec<ComponentRecord> {
        self.find(&FindCriteria::near(center, radius))
    }

    /// All components of one type
    pub fn find_by_type(&self, component_type: ComponentType) -> Vec<ComponentRecord> {
        self.find(&FindCriteria::of_type(component_type))
    }

    /// Occupancy snapshot
    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.read();
        RegistryStats {
            component_count: inner.records.len(),
            connection_count: inner.connections.values().map(|t| t.len()).sum(),
            synapse_count: inner.synapses.len(),
            territory_count: inner.territories.len(),
            grid_cell_count: self.grid.cell_count(),
        }
    }

    /// Number of grid-indexed components. Equals `count()` after every
    /// completed public call.
    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    /// Drop every record, edge, synapse, and territory
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.records.clear();
        inner.connections.clear();
        inner.synapses.clear();
        inner.territories.clear();
        self.grid.clear();
    }
}
