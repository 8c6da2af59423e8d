//! Chemical Concentration Fields
//!
//! One sparse concentration field per ligand species, with release,
//! receptor fan-out, decay, clearance, and analytic diffusion.
//!
//! ## Field model
//!
//! Released amounts are deposited at quantised field points (1 um
//! resolution). Every stored point radiates outward with the kernel
//!
//! ```text
//! spread(d) = (1 - d / max_range) * exp(-d / (diffusion_rate * max_range))   for d < max_range
//! spread(d) = 0                                                              otherwise
//! ```
//!
//! so `get_concentration` answers non-zero within `max_range` of any mass
//! even where no cell is stored, and exactly the deposited amount at the
//! deposit point (`spread(0) = 1`). Each tick applies decay and clearance
//! as separate exponential factors - pharmacology modifies clearance alone -
//! then prunes cells below 1e-6 uM to keep the field sparse.
//!
//! ## Thread model
//!
//! Each ligand field sits behind its own read-write lock. Ticking a ligand
//! takes that field's write lock exclusively; releases take it briefly to
//! deposit; queries take read locks. Receptor fan-out runs after the field
//! lock is dropped, and receivers must not re-enter the field in the same
//! call chain.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::registry::Position3D;

use super::binding::BindingTarget;
use super::ligand::{LigandKinetics, LigandType};
use super::rate_limiter::RateLimiter;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Field-point quantisation (um)
pub const FIELD_RESOLUTION: f64 = 1.0;

/// Stored cells below this concentration (uM) are pruned each tick
pub const CLEANUP_EPSILON: f64 = 1e-6;

// ============================================================================
// FIELD STATE
// ============================================================================

/// Quantised field-point key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FieldPoint(i64, i64, i64);

impl FieldPoint {
    fn from_position(position: &Position3D) -> Self {
        let p = position.sanitized();
        FieldPoint(
            (p.x / FIELD_RESOLUTION).round() as i64,
            (p.y / FIELD_RESOLUTION).round() as i64,
            (p.z / FIELD_RESOLUTION).round() as i64,
        )
    }

    fn center(&self) -> Position3D {
        Position3D::new(
            self.0 as f64 * FIELD_RESOLUTION,
            self.1 as f64 * FIELD_RESOLUTION,
            self.2 as f64 * FIELD_RESOLUTION,
        )
    }
}

/// A registered chemical source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalSource {
    /// Where the source releases
    pub position: Position3D,
    /// Magnitude of the most recent admitted release (uM)
    pub rate: f64,
    /// When the source last released
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LigandField {
    /// Quantised point -> deposited concentration (uM, always >= 0)
    points: HashMap<FieldPoint, f64>,
    /// Source id -> bookkeeping entry
    sources: HashMap<String, ChemicalSource>,
}

/// Occupancy snapshot for one ligand field
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LigandFieldStats {
    /// Stored field points
    pub point_count: usize,
    /// Registered sources
    pub source_count: usize,
    /// Sum of stored concentrations (uM)
    pub total_mass: f64,
}

// ============================================================================
// CHEMICAL FIELD
// ============================================================================

/// The per-ligand concentration fields plus release admission and
/// receptor fan-out.
pub struct ChemicalField {
    kinetics: RwLock<HashMap<LigandType, LigandKinetics>>,
    fields: HashMap<LigandType, RwLock<LigandField>>,
    limiter: RateLimiter,
    targets: RwLock<Vec<Arc<dyn BindingTarget>>>,
}

impl std::fmt::Debug for ChemicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChemicalField")
            .field("ligands", &self.fields.len())
            .field("targets", &self.targets.read().len())
            .finish()
    }
}

impl Default for ChemicalField {
    fn default() -> Self {
        Self::new(RateLimiter::default())
    }
}

impl ChemicalField {
    /// Create fields for every built-in ligand with default kinetics
    pub fn new(limiter: RateLimiter) -> Self {
        let mut kinetics = HashMap::new();
        let mut fields = HashMap::new();
        for ligand in LigandType::ALL {
            kinetics.insert(ligand, LigandKinetics::defaults_for(ligand));
            fields.insert(ligand, RwLock::new(LigandField::default()));
        }
        Self {
            kinetics: RwLock::new(kinetics),
            fields,
            limiter,
            targets: RwLock::new(Vec::new()),
        }
    }

    // ------------------------------------------------------------------
    // Kinetics & pharmacology
    // ------------------------------------------------------------------

    /// Current kinetics for a ligand
    pub fn kinetics(&self, ligand: LigandType) -> LigandKinetics {
        self.kinetics
            .read()
            .get(&ligand)
            .copied()
            .unwrap_or_else(|| LigandKinetics::defaults_for(ligand))
    }

    /// Replace a ligand's kinetics. Non-finite or out-of-range fields are
    /// replaced with the species defaults.
    pub fn set_kinetics(&self, ligand: LigandType, kinetics: LigandKinetics) {
        self.kinetics
            .write()
            .insert(ligand, kinetics.sanitized(ligand));
    }

    /// Scale a ligand's clearance rate, e.g. `scale_clearance(Serotonin,
    /// 0.1)` models an SSRI blocking 90% of reuptake. The fraction is
    /// clamped to [0, 1].
    pub fn scale_clearance(&self, ligand: LigandType, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let mut kinetics = self.kinetics.write();
        if let Some(k) = kinetics.get_mut(&ligand) {
            k.clearance_rate *= fraction;
            tracing::info!(
                ligand = %ligand,
                clearance_rate = k.clearance_rate,
                "clearance rate modulated"
            );
        }
    }

    // ------------------------------------------------------------------
    // Release
    // ------------------------------------------------------------------

    /// Release an amount of ligand from a source at an origin position.
    ///
    /// The rate limiter gates per-source frequency. Admitted releases
    /// deposit at the origin's field point, refresh the source entry, and
    /// synchronously deliver a binding event to every registered target
    /// whose receptors include the ligand. Once this returns, concentration
    /// queries reflect the release.
    pub fn release(
        &self,
        ligand: LigandType,
        source_id: &str,
        origin: Position3D,
        amount: f64,
    ) -> Result<()> {
        if source_id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        if !self.limiter.can_release(source_id) {
            tracing::debug!(source_id, ligand = %ligand, "release rate-limited");
            return Err(CoreError::RateLimited(source_id.to_string()));
        }

        let amount = if amount.is_finite() && amount > 0.0 {
            amount
        } else {
            if !amount.is_finite() {
                tracing::warn!(source_id, ligand = %ligand, "non-finite release amount treated as 0");
            }
            0.0
        };

        let Some(field) = self.fields.get(&ligand) else {
            return Ok(());
        };
        {
            let mut field = field.write();
            if amount > 0.0 {
                *field
                    .points
                    .entry(FieldPoint::from_position(&origin))
                    .or_insert(0.0) += amount;
            }
            field.sources.insert(
                source_id.to_string(),
                ChemicalSource {
                    position: origin,
                    rate: amount,
                    last_update: Utc::now(),
                },
            );
        }

        if amount > 0.0 {
            self.fan_out(ligand, source_id, amount);
        }
        Ok(())
    }

    /// Deliver a binding event to each matching target. Runs with no field
    /// lock held; the target list is snapshotted under its read lock.
    fn fan_out(&self, ligand: LigandType, source_id: &str, amount: f64) {
        let affinity = self.kinetics(ligand).binding_affinity;
        let delivered = amount * affinity;
        if delivered <= 0.0 {
            return;
        }
        let targets: Vec<Arc<dyn BindingTarget>> =
            self.targets.read().iter().map(Arc::clone).collect();
        for target in targets {
            if target.receptors().contains(&ligand) {
                target.on_bind(ligand, source_id, delivered);
            }
        }
    }

    /// Register a receptor-bearing target for release fan-out
    pub fn register_target(&self, target: Arc<dyn BindingTarget>) {
        self.targets.write().push(target);
    }

    /// Remove all targets registered under a component id
    pub fn unregister_target(&self, id: &str) {
        self.targets.write().retain(|t| t.id() != id);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Concentration at a position: the kernel-weighted sum of every stored
    /// point's contribution. Non-negative and finite by construction;
    /// exactly zero beyond `max_range` of all stored mass.
    pub fn get_concentration(&self, ligand: LigandType, position: Position3D) -> f64 {
        let Some(field) = self.fields.get(&ligand) else {
            return 0.0;
        };
        let kinetics = self.kinetics(ligand);
        let position = position.sanitized();

        let field = field.read();
        let mut total = 0.0;
        for (point, amount) in field.points.iter() {
            let d = point.center().distance_to(&position);
            total += amount * spread(d, &kinetics);
        }
        total.max(0.0)
    }

    /// Snapshot of a source entry
    pub fn get_source(&self, ligand: LigandType, source_id: &str) -> Option<ChemicalSource> {
        self.fields
            .get(&ligand)?
            .read()
            .sources
            .get(source_id)
            .cloned()
    }

    /// In-window release count for a source (shared across ligands)
    pub fn source_release_rate(&self, source_id: &str) -> usize {
        self.limiter.current_rate(source_id)
    }

    /// Occupancy snapshot per ligand
    pub fn stats(&self) -> HashMap<LigandType, LigandFieldStats> {
        self.fields
            .iter()
            .map(|(ligand, field)| {
                let field = field.read();
                (
                    *ligand,
                    LigandFieldStats {
                        point_count: field.points.len(),
                        source_count: field.sources.len(),
                        total_mass: field.points.values().sum(),
                    },
                )
            })
            .collect()
    }

    /// Change the per-source release ceiling; applies to subsequent
    /// admissions
    pub fn set_release_limit(&self, max_per_window: usize) {
        self.limiter.set_max_per_window(max_per_window);
    }

    /// Test hook forwarding to the rate limiter
    pub fn reset_rate_limits(&self) {
        self.limiter.reset_limits();
    }

    // ------------------------------------------------------------------
    // Dynamics
    // ------------------------------------------------------------------

    /// Advance one ligand field by `dt` seconds: decay, then clearance,
    /// then sparse cleanup.
    pub fn tick_ligand(&self, ligand: LigandType, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let Some(field) = self.fields.get(&ligand) else {
            return;
        };
        let kinetics = self.kinetics(ligand);
        let decay_factor = (-kinetics.decay_rate * dt).exp();
        let clearance_factor = (-kinetics.clearance_rate * dt).exp();

        let mut field = field.write();
        for amount in field.points.values_mut() {
            *amount *= decay_factor;
            *amount *= clearance_factor;
        }
        field.points.retain(|_, amount| *amount >= CLEANUP_EPSILON);
    }

    /// Advance every ligand field by `dt` seconds. Deterministic test
    /// entry point; the automatic mode calls the same path.
    pub fn tick(&self, dt: f64) {
        for ligand in self.fields.keys() {
            self.tick_ligand(*ligand, dt);
        }
    }

    /// Drop all stored mass and sources for every ligand
    pub fn clear(&self) {
        for field in self.fields.values() {
            let mut field = field.write();
            field.points.clear();
            field.sources.clear();
        }
    }

    // ------------------------------------------------------------------
    // Automatic mode
    // ------------------------------------------------------------------

    /// Spawn one background tick task per ligand at the given interval.
    ///
    /// The returned handle aborts every task when dropped. Requires a
    /// running tokio runtime.
    pub fn spawn_tickers(self: &Arc<Self>, interval: Duration) -> TickerHandle {
        let dt = interval.as_secs_f64();
        let handles = LigandType::ALL
            .into_iter()
            .map(|ligand| {
                let field = Arc::clone(self);
                tokio::spawn(async move {
                    let mut timer = tokio::time::interval(interval);
                    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    loop {
                        timer.tick().await;
                        field.tick_ligand(ligand, dt);
                    }
                })
            })
            .collect();
        TickerHandle { handles }
    }
}

/// The analytic radiation kernel. 1 at the origin, 0 at and beyond
/// `max_range`, multiplicatively shaped by an exponential whose length is
/// `diffusion_rate * max_range`.
fn spread(distance: f64, kinetics: &LigandKinetics) -> f64 {
    if distance >= kinetics.max_range || kinetics.max_range <= 0.0 {
        return 0.0;
    }
    let linear = 1.0 - distance / kinetics.max_range;
    let length = (kinetics.diffusion_rate * kinetics.max_range).max(f64::EPSILON);
    linear * (-distance / length).exp()
}

/// Aborts the per-ligand tick tasks on drop.
#[derive(Debug)]
pub struct TickerHandle {
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
