//! Core Error Types
//!
//! The closed error set for the coordination core. Structural problems
//! (unknown ids on write paths, duplicates, rate limits, exhausted capacity)
//! are surfaced as variants here; numeric-sanity problems (NaN/infinite
//! activity or scores) are recovered locally with conservative defaults and
//! never reach this enum.

use thiserror::Error;

/// Errors surfaced by the coordination core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A component id was empty
    #[error("component id must not be empty")]
    EmptyId,
    /// A component with this id already exists (strict-creation path only)
    #[error("component already exists: {0}")]
    DuplicateId(String),
    /// A referenced component is not registered
    #[error("unknown component: {0}")]
    UnknownComponent(String),
    /// A referenced synapse collaborator is not registered
    #[error("unknown synapse: {0}")]
    UnknownSynapse(String),
    /// A chemical source exceeded its release rate window
    #[error("release rate limit exceeded for source: {0}")]
    RateLimited(String),
    /// Component capacity is exhausted
    #[error("component capacity exhausted ({current}/{max})")]
    ResourceExhausted {
        /// Components currently registered
        current: usize,
        /// Configured capacity
        max: usize,
    },
    /// No territory is established for the given astrocyte
    #[error("no territory established for astrocyte: {0}")]
    AstrocyteUnknown(String),
    /// A plasticity adjustment was outside its validity bounds
    #[error("invalid plasticity adjustment: {0}")]
    InvalidAdjustment(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, CoreError>;
