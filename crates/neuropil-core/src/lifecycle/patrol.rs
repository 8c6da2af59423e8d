//! Territorial Patrol
//!
//! Microglial surveillance: each route covers a territory, and executing a
//! patrol sweeps every component inside it through the health monitor.
//! Patrols are chunked - one call covers one route once - and the caller
//! owns the cadence; `due_patrols` reports which routes have waited past
//! their rate.
//!
//! Execution follows the two-phase pattern: copy the route under the
//! scheduler's read lock, release it, run the spatial query and the health
//! sweep with no scheduler lock held, then re-acquire to update counters.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::PatrolConfig;
use crate::error::{CoreError, Result};
use crate::registry::{ComponentRegistry, Position3D, Territory};

use super::health::HealthMonitor;

// ============================================================================
// ROUTES & REPORTS
// ============================================================================

/// A microglia's standing surveillance route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolRoute {
    /// Owning microglia id
    pub microglia_id: String,
    /// Territory swept by this route
    pub territory: Territory,
    /// Minimum interval between patrols
    pub patrol_rate: Duration,
    /// When the route was last patrolled
    pub last_patrol: DateTime<Utc>,
    /// Cumulative components checked across patrols
    pub components_checked: u64,
}

/// Outcome of one patrol sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolReport {
    /// Microglia that patrolled
    pub microglia_id: String,
    /// When the sweep ran
    pub patrol_time: DateTime<Utc>,
    /// Components observed in this sweep
    pub components_checked: usize,
    /// Total issues raised across observed components
    pub issues_found: usize,
    /// Components whose score fell below the problem threshold
    pub health_problems: Vec<String>,
    /// Components weak enough to suggest for pruning review
    pub pruning_candidates: Vec<String>,
}

// ============================================================================
// PATROL SCHEDULER
// ============================================================================

/// Schedules and executes territorial surveillance.
#[derive(Debug)]
pub struct PatrolScheduler {
    registry: Arc<ComponentRegistry>,
    health: Arc<HealthMonitor>,
    config: RwLock<PatrolConfig>,
    routes: RwLock<HashMap<String, PatrolRoute>>,
}

impl PatrolScheduler {
    /// Create a scheduler over the shared registry and health monitor
    pub fn new(
        registry: Arc<ComponentRegistry>,
        health: Arc<HealthMonitor>,
        config: PatrolConfig,
    ) -> Self {
        Self {
            registry,
            health,
            config: RwLock::new(config),
            routes: RwLock::new(HashMap::new()),
        }
    }

    /// Swap the patrol configuration; applies to subsequent patrols
    pub fn set_config(&self, config: PatrolConfig) {
        *self.config.write() = config;
    }

    /// Establish (or overwrite) a route for a microglia. `patrol_rate`
    /// of `None` uses the configured default.
    pub fn establish_route(
        &self,
        microglia_id: &str,
        center: Position3D,
        radius: f64,
        patrol_rate: Option<Duration>,
    ) -> Result<()> {
        if microglia_id.is_empty() {
            return Err(CoreError::EmptyId);
        }
        let rate = patrol_rate.unwrap_or_else(|| self.config.read().patrol_rate);
        let route = PatrolRoute {
            microglia_id: microglia_id.to_string(),
            territory: Territory::new(microglia_id, center, radius),
            patrol_rate: rate,
            // A fresh route is immediately due
            last_patrol: crate::registry::ComponentRecord::unset_timestamp(),
            components_checked: 0,
        };
        self.routes.write().insert(microglia_id.to_string(), route);
        Ok(())
    }

    /// Snapshot of a route
    pub fn get_route(&self, microglia_id: &str) -> Option<PatrolRoute> {
        self.routes.read().get(microglia_id).cloned()
    }

    /// Routes whose patrol rate has elapsed at `now`
    pub fn due_patrols(&self, now: DateTime<Utc>) -> Vec<String> {
        self.routes
            .read()
            .values()
            .filter(|route| {
                now.signed_duration_since(route.last_patrol)
                    .to_std()
                    .map(|elapsed| elapsed >= route.patrol_rate)
                    .unwrap_or(false)
            })
            .map(|route| route.microglia_id.clone())
            .collect()
    }

    /// Sweep one route: observe every component in its territory through
    /// the health monitor and summarise what was found.
    pub fn execute_patrol(&self, microglia_id: &str) -> Result<PatrolReport> {
        // Phase 1: copy the route, release the scheduler lock
        let route = self
            .routes
            .read()
            .get(microglia_id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownComponent(microglia_id.to_string()))?;
        let config = self.config.read().clone();

        // Phase 2: spatial query and health sweep, no scheduler lock held
        let observed = self
            .registry
            .find_nearby(route.territory.center, route.territory.radius);

        let now = Utc::now();
        let mut issues_found = 0;
        let mut health_problems = Vec::new();
        let mut pruning_candidates = Vec::new();
        let mut monitored_ids = Vec::with_capacity(observed.len());

        for component in &observed {
            // The microglia sees presence and wiring, not firing; activity
            // is the configured synthetic level until a measurement exists.
            let connections = self.registry.connection_count(&component.id);
            let health = self
                .health
                .update(&component.id, config.default_activity, connections);

            issues_found += health.issues.len();
            if health.health_score < config.problem_score {
                health_problems.push(component.id.clone());
            }
            if health.health_score < config.candidate_score {
                pruning_candidates.push(component.id.clone());
            }
            monitored_ids.push(component.id.clone());
        }

        // Phase 3: re-acquire and update counters. The route may have been
        // re-established meanwhile; update whatever is current.
        {
            let mut routes = self.routes.write();
            if let Some(current) = routes.get_mut(microglia_id) {
                current.last_patrol = now;
                current.components_checked += observed.len() as u64;
                current.territory.monitored_ids = monitored_ids;
                current.territory.last_activity = now;
            }
        }

        Ok(PatrolReport {
            microglia_id: microglia_id.to_string(),
            patrol_time: now,
            components_checked: observed.len(),
            issues_found,
            health_problems,
            pruning_candidates,
        })
    }

    /// Remove a route (on microglia unregister)
    pub fn remove_route(&self, microglia_id: &str) -> bool {
        self.routes.write().remove(microglia_id).is_some()
    }

    /// Number of standing routes
    pub fn route_count(&self) -> usize {
        self.routes.read().len()
    }
}
