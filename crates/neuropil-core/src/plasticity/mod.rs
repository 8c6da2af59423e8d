//! Plasticity Dispatch
//!
//! Directed weight and STDP events to synapse collaborators:
//! - The `Synapse` trait the core drives but never implements
//! - Asymmetric exponential STDP window (Bi & Poo 1998)
//! - Outcome reporting into the registry and health monitor
//! - Calcium signalling for significant weight changes

mod dispatcher;
mod stdp;

pub use dispatcher::{
    CALCIUM_SIGNAL_GAIN, PlasticityAdjustment, PlasticityConfig, PlasticityDispatcher,
    PlasticityEvent, PlasticityEventKind, SIGNIFICANT_WEIGHT_CHANGE, Synapse,
};
pub use stdp::{
    LTD_ASYMMETRY, MAX_DELTA_T_MS, MAX_LEARNING_RATE, STDP_TAU_MS, STDP_WINDOW_MS,
    stdp_weight_change,
};
