//! Astrocyte Territory Management
//!
//! Astrocytes tile the neuropil into largely non-overlapping spherical
//! domains (Bushong et al. 2002) and shrink their arbors when overloaded.
//! `validate_load` models that homeostasis: when a territory monitors more
//! neurons than its budget, the radius contracts by sqrt(max/current),
//! which converges because the monitored population scales with enclosed
//! volume.
//!
//! The load check is the canonical two-phase pattern: copy the territory
//! under a read lock, release, run the spatial query with no registry lock
//! held, then re-acquire for the write. Holding the registry lock across
//! the query would deadlock against the grid-backed search path.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{CoreError, Result};

use super::registry::ComponentRegistry;
use super::types::{ComponentType, Position3D, Territory};

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Outcome of an astrocyte load validation.
///
/// An over-budget territory is not an error: the radius is adjusted and the
/// caller receives this advisory describing what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadDiagnostic {
    /// Astrocyte whose territory was validated
    pub astrocyte_id: String,
    /// Neurons found inside the territory at validation time
    pub neuron_count: usize,
    /// Configured budget
    pub max_neurons: usize,
    /// Radius before validation (um)
    pub old_radius: f64,
    /// Radius after validation (um); equals `old_radius` when no
    /// adjustment was needed
    pub new_radius: f64,
    /// Whether the territory was shrunk
    pub adjusted: bool,
}

// ============================================================================
// TERRITORY MANAGER
// ============================================================================

/// Establishes astrocyte territories and enforces their load budgets.
#[derive(Debug, Clone)]
pub struct TerritoryManager {
    registry: Arc<ComponentRegistry>,
}

impl TerritoryManager {
    /// Create a manager over the shared registry
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self { registry }
    }

    /// Establish (or overwrite) a territory for an astrocyte.
    /// Negative radii are clamped to zero.
    pub fn establish(&self, astrocyte_id: &str, center: Position3D, radius: f64) -> Result<()> {
        if astrocyte_id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        self.registry
            .set_territory(Territory::new(astrocyte_id, center, radius));
        Ok(())
    }

    /// Snapshot of an astrocyte's territory
    pub fn get(&self, astrocyte_id: &str) -> Option<Territory> {
        self.registry.get_territory(astrocyte_id)
    }

    /// Validate a territory's neuron load, shrinking the radius when the
    /// budget is exceeded.
    ///
    /// Phases:
    /// 1. Copy the territory (registry read lock, released immediately)
    /// 2. Count neurons inside it (spatial query, own locks)
    /// 3. If over budget, re-acquire the write lock, re-read the territory
    ///    (it may have been deleted meanwhile), apply
    ///    `new_radius = old_radius * sqrt(max / current)`
    pub fn validate_load(&self, astrocyte_id: &str, max_neurons: usize) -> Result<LoadDiagnostic> {
        // Phase 1: snapshot
        let territory = self
            .registry
            .get_territory(astrocyte_id)
            .ok_or_else(|| CoreError::AstrocyteUnknown(astrocyte_id.to_string()))?;

        // Phase 2: query with no registry lock held
        let neuron_count = self
            .registry
            .find_nearby(territory.center, territory.radius)
            .iter()
            .filter(|r| r.component_type == ComponentType::Neuron)
            .count();

        if neuron_count <= max_neurons {
            return Ok(LoadDiagnostic {
                astrocyte_id: astrocyte_id.to_string(),
                neuron_count,
                max_neurons,
                old_radius: territory.radius,
                new_radius: territory.radius,
                adjusted: false,
            });
        }

        // Phase 3: re-acquire and apply. The territory may have been
        // deleted between phases; surface that rather than resurrecting it.
        let new_radius = territory.radius * (max_neurons as f64 / neuron_count as f64).sqrt();
        let applied = self.registry.update_territory(astrocyte_id, |t| {
            t.radius = new_radius;
        });
        if !applied {
            return Err(CoreError::AstrocyteUnknown(astrocyte_id.to_string()));
        }

        tracing::info!(
            astrocyte_id,
            neuron_count,
            max_neurons,
            old_radius = territory.radius,
            new_radius,
            "territory over budget, radius adjusted"
        );

        Ok(LoadDiagnostic {
            astrocyte_id: astrocyte_id.to_string(),
            neuron_count,
            max_neurons,
            old_radius: territory.radius,
            new_radius,
            adjusted: true,
        })
    }
}
