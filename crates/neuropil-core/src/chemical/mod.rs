//! Chemical Diffusion Field
//!
//! Per-ligand concentration fields with biologically-plausible release,
//! decay, clearance, and analytic diffusion:
//! - Sliding-window rate limiting per source
//! - Synchronous receptor fan-out on release
//! - Separate decay and clearance kinetics so pharmacology can target
//!   clearance alone
//! - Manual `tick(dt)` for deterministic tests, background tasks otherwise

mod binding;
mod field;
mod ligand;
mod rate_limiter;

pub use binding::BindingTarget;
pub use field::{
    CLEANUP_EPSILON, ChemicalField, ChemicalSource, FIELD_RESOLUTION, LigandFieldStats,
    TickerHandle,
};
pub use ligand::{LigandKinetics, LigandType};
pub use rate_limiter::{DEFAULT_MAX_RELEASES_PER_WINDOW, RELEASE_WINDOW, RateLimiter};
