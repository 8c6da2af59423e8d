//! End-to-end test support for the neuropil coordination core.
//!
//! - `harness`: wired `CoordinationCore` builders for isolated tests
//! - `mocks`: synapse and binding-target doubles plus data factories

pub mod harness;
pub mod mocks;
