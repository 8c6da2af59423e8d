//! Sparse Spatial Grid
//!
//! Partitions space into cubic cells the size of a typical astrocyte
//! territory and indexes component positions for O(1) insertion and
//! near-O(1) radius queries at 10^5 components.
//!
//! ## Locking
//!
//! Two levels, taken strictly top-down:
//!
//! 1. A top read-write lock over the cell map (structural changes are rare)
//! 2. One read-write lock per cell for its members
//!
//! No path holds two cell locks, and no path acquires the top lock while
//! holding a cell lock. Empty cells are retired under the top write lock
//! with a tombstone flag so a concurrent insert that already fetched the
//! cell retries instead of writing into an orphan.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::types::Position3D;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default cell edge length (um). Matches a typical astrocyte domain.
pub const DEFAULT_CELL_SIZE: f64 = 50.0;

/// Cap on cells searched per axis, preventing runaway enumeration when a
/// caller passes a pathological radius.
pub const MAX_CELLS_PER_AXIS: i64 = 100;

/// Tolerance added to the query radius before the precise distance filter.
pub const DISTANCE_EPSILON: f64 = 1e-9;

// ============================================================================
// CELLS
// ============================================================================

/// Integer cell coordinates: (floor(x/L), floor(y/L), floor(z/L))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey(i64, i64, i64);

#[derive(Debug, Default)]
struct Cell {
    /// Member id -> position snapshot (original, unsanitised coordinates)
    members: RwLock<HashMap<String, Position3D>>,
    /// Set under the top write lock when the cell is removed from the map.
    /// Writers that fetched the Arc before retirement must retry.
    retired: AtomicBool,
}

// ============================================================================
// SPATIAL GRID
// ============================================================================

/// Sparse 3D grid mapping cell coordinates to member sets.
///
/// Positions with non-finite coordinates are normalised to the origin cell
/// for key computation; the stored snapshot preserves the original value so
/// such components remain retrievable.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: RwLock<HashMap<CellKey, Arc<Cell>>>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialGrid {
    /// Create a grid with the given cell edge length (um).
    /// Non-positive or non-finite sizes fall back to the default.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: RwLock::new(HashMap::new()),
        }
    }

    /// Cell edge length (um)
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn key_for(&self, position: &Position3D) -> CellKey {
        let p = position.sanitized();
        CellKey(
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Fetch the cell for a key, creating it if absent.
    fn cell_for_insert(&self, key: CellKey) -> Arc<Cell> {
        if let Some(cell) = self.cells.read().get(&key) {
            return Arc::clone(cell);
        }
        let mut cells = self.cells.write();
        Arc::clone(cells.entry(key).or_default())
    }

    /// Insert or move an id's position snapshot.
    pub fn insert(&self, id: &str, position: Position3D) {
        let key = self.key_for(&position);
        loop {
            let cell = self.cell_for_insert(key);
            let mut members = cell.members.write();
            if cell.retired.load(Ordering::Acquire) {
                // Lost a race with retirement; the key no longer maps here.
                continue;
            }
            members.insert(id.to_string(), position);
            return;
        }
    }

    /// Remove an id from the cell its position maps to.
    /// Returns whether the id was present.
    pub fn remove(&self, id: &str, position: &Position3D) -> bool {
        let key = self.key_for(position);
        let Some(cell) = self.cells.read().get(&key).map(Arc::clone) else {
            return false;
        };
        let emptied = {
            let mut members = cell.members.write();
            let removed = members.remove(id).is_some();
            if !removed {
                return false;
            }
            members.is_empty()
        };
        if emptied {
            self.retire_if_empty(key, &cell);
        }
        true
    }

    /// Remove an emptied cell from the map. Re-checks emptiness under the
    /// top write lock so a concurrent insert either lands before retirement
    /// or observes the tombstone and retries.
    fn retire_if_empty(&self, key: CellKey, cell: &Arc<Cell>) {
        let mut cells = self.cells.write();
        let Some(current) = cells.get(&key) else {
            return;
        };
        if !Arc::ptr_eq(current, cell) {
            return;
        }
        let members = cell.members.write();
        if members.is_empty() {
            cell.retired.store(true, Ordering::Release);
            drop(members);
            cells.remove(&key);
        }
    }

    /// All (id, position) pairs within `radius` of `center`.
    ///
    /// `radius <= 0` inspects only the centre cell and matches exact
    /// (bitwise-equal) positions. Otherwise cells whose bounding cube
    /// intersects the query sphere are enumerated (capped per axis) and
    /// members pass a precise Euclidean filter with a small tolerance.
    pub fn query_radius(&self, center: &Position3D, radius: f64) -> Vec<(String, Position3D)> {
        if !radius.is_finite() || radius <= 0.0 {
            return self.query_exact(center);
        }

        let CellKey(cx, cy, cz) = self.key_for(center);
        let span = ((radius / self.cell_size).ceil() as i64).min(MAX_CELLS_PER_AXIS);
        let center = center.sanitized();
        let limit = radius + DISTANCE_EPSILON;

        // Collect candidate cells in one pass under the top read lock, then
        // filter per cell without it.
        let candidates: Vec<Arc<Cell>> = {
            let cells = self.cells.read();
            let mut out = Vec::new();
            for dx in -span..=span {
                for dy in -span..=span {
                    for dz in -span..=span {
                        if let Some(cell) = cells.get(&CellKey(cx + dx, cy + dy, cz + dz)) {
                            out.push(Arc::clone(cell));
                        }
                    }
                }
            }
            out
        };

        let mut results = Vec::new();
        for cell in candidates {
            let members = cell.members.read();
            for (id, position) in members.iter() {
                if position.sanitized().distance_to(&center) <= limit {
                    results.push((id.clone(), *position));
                }
            }
        }
        results
    }

    fn query_exact(&self, center: &Position3D) -> Vec<(String, Position3D)> {
        let key = self.key_for(center);
        let Some(cell) = self.cells.read().get(&key).map(Arc::clone) else {
            return Vec::new();
        };
        let members = cell.members.read();
        members
            .iter()
            .filter(|(_, position)| position.bitwise_eq(center))
            .map(|(id, position)| (id.clone(), *position))
            .collect()
    }

    /// Total number of indexed components
    pub fn len(&self) -> usize {
        let cells: Vec<Arc<Cell>> = self.cells.read().values().map(Arc::clone).collect();
        cells.iter().map(|c| c.members.read().len()).sum()
    }

    /// Whether the grid holds no components
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live cells
    pub fn cell_count(&self) -> usize {
        self.cells.read().len()
    }

    /// Drop all cells and members
    pub fn clear(&self) {
        self.cells.write().clear();
    }
}
