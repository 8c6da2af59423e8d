//! Lifecycle Supervision
//!
//! The microglial side of the core: who gets created, who gets watched,
//! and what gets pruned.
//!
//! - **HealthMonitor**: bounded health scores and named issues per component
//! - **PruningEngine**: mark/score/execute connection elimination with age
//!   and score gates
//! - **BirthQueue**: priority-gated creation with an emergency capacity
//!   bypass
//! - **PatrolScheduler**: territorial surveillance feeding the health
//!   monitor
//! - **LifecycleSupervisor**: wiring plus the removal cascade

mod birth;
mod health;
mod patrol;
mod pruning;
mod supervisor;

pub use birth::{BirthPriority, BirthQueue, BirthRequest};
pub use health::{ComponentHealth, HealthIssue, HealthMonitor, SurveillanceState};
pub use patrol::{PatrolReport, PatrolRoute, PatrolScheduler};
pub use pruning::{MODERATE_DEFAULT_SCORE, PruningEngine, PruningTarget};
pub use supervisor::{LifecycleStats, LifecycleSupervisor};
