//! # Neuropil Core
//!
//! The extracellular coordination core of a biologically-inspired neural
//! simulation platform. Neurons and synapses bring their own dynamics;
//! this crate provides the tissue they live in:
//!
//! - **Spatial Component Registry**: a concurrent sparse 3D grid mapping
//!   component ids to position/type/state, with radius queries that stay
//!   fast at 10^5 components
//! - **Chemical Diffusion Field**: per-ligand concentration fields with
//!   rate-limited release, receptor fan-out, and separately modelled decay
//!   and clearance (so pharmacology like SSRIs can target clearance alone)
//! - **Lifecycle Supervisor**: the microglial machinery - health scoring,
//!   mark/score/execute pruning, priority-gated birth with an emergency
//!   capacity bypass, and territorial patrol
//!
//! ## Biological Grounding
//!
//! - **Astrocyte territories**: cortical astrocytes tile space into
//!   largely non-overlapping ~50 um domains (Bushong et al. 2002); the
//!   grid cell size and territory model follow that scale.
//! - **Volume transmission**: neuromodulators act far beyond the synaptic
//!   cleft (Fuxe & Agnati); ligand kinetics separate short-range
//!   fast-cleared transmitters from long-range slow-cleared modulators.
//! - **Microglial surveillance**: resting microglia continuously patrol
//!   and rescan their territory (Nimmerjahn et al. 2005).
//! - **STDP**: the asymmetric exponential window follows Bi & Poo (1998).
//!
//! ## Quick Start
//!
//! ```rust
//! use neuropil_core::prelude::*;
//!
//! let core = CoordinationCore::default();
//!
//! // Register components
//! core.register_component(ComponentRecord::new(
//!     "n1",
//!     ComponentType::Neuron,
//!     Position3D::new(0.0, 0.0, 0.0),
//! ))?;
//!
//! // Query by proximity
//! let nearby = core.find_nearby(Position3D::new(0.0, 0.0, 0.0), 20.0);
//! assert_eq!(nearby.len(), 1);
//!
//! // Release a chemical and read it back
//! core.release_chemical(
//!     LigandType::Dopamine,
//!     "n1",
//!     Position3D::new(0.0, 0.0, 0.0),
//!     5.0,
//! )?;
//! assert!(core.get_concentration(LigandType::Dopamine, Position3D::new(0.0, 0.0, 0.0)) > 0.0);
//! # Ok::<(), neuropil_core::CoreError>(())
//! ```
//!
//! ## Concurrency Model
//!
//! Parallel threads over shared state, no global event loop. The locking
//! discipline is strict: the registry lock is never held across calls into
//! the chemical field, health monitor, or pruning engine (they query the
//! registry back); operations that read, query, then write use a two-phase
//! copy-release-reacquire pattern; grid cells and rate-limiter windows are
//! leaf locks. The chemical field's background tick runs one tokio task
//! per ligand, with a manual `tick(dt)` path for deterministic tests.

// ============================================================================
// MODULES
// ============================================================================

pub mod chemical;
pub mod config;
mod coordination;
pub mod error;
pub mod lifecycle;
pub mod plasticity;
pub mod registry;
pub mod signaling;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Facade
pub use coordination::{CoordinationCore, CoordinationStats};

// Errors
pub use error::{CoreError, Result};

// Configuration
pub use config::{
    CoordinationConfig, HealthConfig, PatrolConfig, PruningConfig, ResourceConfig,
};

// Registry types
pub use registry::{
    ComponentRecord, ComponentRegistry, ComponentState, ComponentType, FindCriteria,
    LoadDiagnostic, Position3D, RegistryStats, SpatialGrid, SynapticRecord, Territory,
    TerritoryManager,
};

// Chemical field
pub use chemical::{
    BindingTarget, ChemicalField, ChemicalSource, LigandFieldStats, LigandKinetics, LigandType,
    RateLimiter, TickerHandle,
};

// Lifecycle supervision
pub use lifecycle::{
    BirthPriority, BirthQueue, BirthRequest, ComponentHealth, HealthIssue, HealthMonitor,
    LifecycleStats, LifecycleSupervisor, PatrolReport, PatrolRoute, PatrolScheduler,
    PruningEngine, PruningTarget, SurveillanceState,
};

// Plasticity
pub use plasticity::{
    PlasticityAdjustment, PlasticityConfig, PlasticityDispatcher, PlasticityEvent,
    PlasticityEventKind, Synapse, stdp_weight_change,
};

// Electrical signalling interface (broadcaster lives outside the core)
pub use signaling::SignalListener;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Grid cell edge length matching a typical astrocyte territory (um)
pub const ASTROCYTE_DOMAIN_UM: f64 = registry::DEFAULT_CELL_SIZE;

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        BindingTarget, BirthPriority, BirthRequest, ChemicalField, ComponentHealth,
        ComponentRecord, ComponentRegistry, ComponentState, ComponentType, CoordinationConfig,
        CoordinationCore, CoreError, FindCriteria, HealthIssue, LigandKinetics, LigandType,
        LoadDiagnostic, PatrolReport, PlasticityAdjustment, Position3D, PruningTarget, Result,
        SurveillanceState, Synapse, SynapticRecord, Territory,
    };
}
