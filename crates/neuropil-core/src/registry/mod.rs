//! Spatial Component Registry
//!
//! Identity, position, connectivity, and territory bookkeeping:
//! - Sparse 3D grid indexing positions for high-throughput radius queries
//! - Concurrent registry owning component records and synaptic activity
//! - Astrocyte territory establishment and load-driven radius homeostasis

mod grid;
mod registry;
mod territory;
pub mod types;

pub use grid::{DEFAULT_CELL_SIZE, DISTANCE_EPSILON, MAX_CELLS_PER_AXIS, SpatialGrid};
pub use registry::{ComponentRegistry, RegistryStats};
pub use territory::{LoadDiagnostic, TerritoryManager};
pub use types::{
    COORDINATE_CLAMP, ComponentRecord, ComponentState, ComponentType, FindCriteria, Position3D,
    SynapticRecord, Territory,
};
