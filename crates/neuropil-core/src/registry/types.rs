//! Component Data Model
//!
//! The shared identity/position/state vocabulary every subsystem speaks:
//!
//! - Positions in micrometres, matching the scale of real neuropil
//! - Opaque string component ids, unique within one registry instance
//! - Immutable record snapshots - the registry owns the originals
//! - Synaptic activity records that double as connectivity edges
//! - Astrocyte territories (Bushong et al. 2002: cortical astrocytes tile
//!   space in largely non-overlapping domains of roughly 50 um)

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coordinate magnitudes beyond this are clamped for grid-key computation.
pub const COORDINATE_CLAMP: f64 = 1e12;

// ============================================================================
// POSITION
// ============================================================================

/// A point in 3D space, in micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Position3D {
    /// X coordinate (um)
    pub x: f64,
    /// Y coordinate (um)
    pub y: f64,
    /// Z coordinate (um)
    pub z: f64,
}

impl Position3D {
    /// Create a position from coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin (0, 0, 0)
    pub const ORIGIN: Position3D = Position3D { x: 0.0, y: 0.0, z: 0.0 };

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: &Position3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Whether all three coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Copy with non-finite coordinates normalised to 0 and extreme
    /// magnitudes clamped. Used for grid-key computation only; stored
    /// snapshots keep the original coordinates.
    pub fn sanitized(&self) -> Position3D {
        fn clean(v: f64) -> f64 {
            if !v.is_finite() {
                0.0
            } else {
                v.clamp(-COORDINATE_CLAMP, COORDINATE_CLAMP)
            }
        }
        Position3D {
            x: clean(self.x),
            y: clean(self.y),
            z: clean(self.z),
        }
    }

    /// Bitwise coordinate equality (distinguishes -0.0 from 0.0, treats
    /// identical NaN payloads as equal). Used for exact-match queries.
    pub fn bitwise_eq(&self, other: &Position3D) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }
}

impl std::fmt::Display for Position3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ============================================================================
// COMPONENT TYPE / STATE
// ============================================================================

/// The biological role of a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    /// An excitable cell that integrates and fires
    #[default]
    Neuron,
    /// A chemical connection between two neurons
    Synapse,
    /// A gating element on a transmission path
    Gate,
    /// A territorial bookkeeper monitoring a spherical domain
    Astrocyte,
    /// A lifecycle supervisor: birth, death, pruning, patrol
    Microglia,
}

impl ComponentType {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Neuron => "neuron",
            ComponentType::Synapse => "synapse",
            ComponentType::Gate => "gate",
            ComponentType::Astrocyte => "astrocyte",
            ComponentType::Microglia => "microglia",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "neuron" => Some(ComponentType::Neuron),
            "synapse" => Some(ComponentType::Synapse),
            "gate" => Some(ComponentType::Gate),
            "astrocyte" => Some(ComponentType::Astrocyte),
            "microglia" => Some(ComponentType::Microglia),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Activity state of a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ComponentState {
    /// Participating in the simulation
    #[default]
    Active,
    /// Registered but quiescent
    Inactive,
    /// Marked for removal; no new connections should be made
    ShuttingDown,
}

impl ComponentState {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentState::Active => "active",
            ComponentState::Inactive => "inactive",
            ComponentState::ShuttingDown => "shuttingDown",
        }
    }
}

impl std::fmt::Display for ComponentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// COMPONENT RECORD
// ============================================================================

/// A registered component.
///
/// The registry exclusively owns these; every accessor hands out clones, so
/// holding a record never pins registry state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Unique identifier (non-empty; UUIDs for generated components)
    pub id: String,
    /// Biological role
    pub component_type: ComponentType,
    /// Position in space (um)
    pub position: Position3D,
    /// Activity state
    pub state: ComponentState,
    /// When the component was registered. The epoch sentinel is replaced
    /// with the current time at registration.
    pub registered_at: DateTime<Utc>,
    /// Opaque per-component metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ComponentRecord {
    /// Create an active record stamped with the current time
    pub fn new(id: impl Into<String>, component_type: ComponentType, position: Position3D) -> Self {
        Self {
            id: id.into(),
            component_type,
            position,
            state: ComponentState::Active,
            registered_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// The epoch sentinel meaning "timestamp not set by the caller"
    pub fn unset_timestamp() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).single().unwrap_or_else(Utc::now)
    }
}

// ============================================================================
// SYNAPTIC RECORD
// ============================================================================

/// Activity bookkeeping for one synapse.
///
/// Creating or updating a record implicitly creates the pre -> post
/// connectivity edge. Strength keeps the newest reported value; the
/// activity count accumulates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynapticRecord {
    /// Synapse identifier
    pub synapse_id: String,
    /// Pre-synaptic component id
    pub pre_id: String,
    /// Post-synaptic component id
    pub post_id: String,
    /// Most recently reported strength (>= 0)
    pub strength: f64,
    /// When activity was last reported
    pub last_activity: DateTime<Utc>,
    /// Number of activity reports (>= 1)
    pub activity_count: u64,
}

// ============================================================================
// TERRITORY
// ============================================================================

/// An astrocyte's spherical monitoring domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
    /// Owning astrocyte id
    pub astrocyte_id: String,
    /// Centre of the domain (um)
    pub center: Position3D,
    /// Radius of the domain (um, >= 0)
    pub radius: f64,
    /// Ids currently monitored (may be empty)
    #[serde(default)]
    pub monitored_ids: Vec<String>,
    /// Last time the territory was touched
    pub last_activity: DateTime<Utc>,
}

impl Territory {
    /// Create a territory with no monitored components yet
    pub fn new(astrocyte_id: impl Into<String>, center: Position3D, radius: f64) -> Self {
        Self {
            astrocyte_id: astrocyte_id.into(),
            center,
            radius: radius.max(0.0),
            monitored_ids: Vec::new(),
            last_activity: Utc::now(),
        }
    }

    /// Whether a position falls inside the territory sphere
    pub fn contains(&self, position: &Position3D) -> bool {
        self.center.distance_to(position) <= self.radius
    }
}

// ============================================================================
// FIND CRITERIA
// ============================================================================

/// Combined filter for registry searches.
///
/// Spatial semantics:
/// - `position` with `radius > 0`: grid-accelerated sphere query
/// - `position` with `radius == 0`: exact (bitwise) position match
/// - `radius < 0` or no position: no spatial filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindCriteria {
    /// Restrict to a component type
    pub component_type: Option<ComponentType>,
    /// Restrict to a component state
    pub state: Option<ComponentState>,
    /// Centre of a spatial filter
    pub position: Option<Position3D>,
    /// Radius of the spatial filter (um)
    pub radius: Option<f64>,
}

impl FindCriteria {
    /// Sphere query around a position
    pub fn near(position: Position3D, radius: f64) -> Self {
        Self {
            position: Some(position),
            radius: Some(radius),
            ..Default::default()
        }
    }

    /// All components of one type
    pub fn of_type(component_type: ComponentType) -> Self {
        Self {
            component_type: Some(component_type),
            ..Default::default()
        }
    }
}
