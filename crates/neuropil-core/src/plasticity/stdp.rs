//! STDP Window Mathematics
//!
//! Spike-timing-dependent plasticity per Bi & Poo (1998): the sign of the
//! weight change follows the sign of the pre-to-post spike interval, the
//! magnitude falls off exponentially with tau ~ 20 ms, and depression is
//! slightly stronger than potentiation so uncorrelated firing nets out
//! depressive.
//!
//! Pure functions; validation of caller-supplied adjustments lives with
//! the dispatcher.

/// Exponential time constant of the STDP window (ms)
pub const STDP_TAU_MS: f64 = 20.0;

/// Depression/potentiation asymmetry factor
pub const LTD_ASYMMETRY: f64 = 1.05;

/// Half-width of the effective window (ms); zero change outside it
pub const STDP_WINDOW_MS: f64 = 100.0;

/// Largest spike-timing difference a caller may submit (ms)
pub const MAX_DELTA_T_MS: f64 = 200.0;

/// Largest admissible learning rate
pub const MAX_LEARNING_RATE: f64 = 0.1;

/// Weight change for a spike-timing difference.
///
/// `delta_t_ms` is post-spike time minus pre-spike time: positive means
/// pre fired first (potentiation), negative means post fired first
/// (depression). Exactly zero and anything outside the +/-100 ms window
/// produce no change.
pub fn stdp_weight_change(delta_t_ms: f64, learning_rate: f64) -> f64 {
    if !delta_t_ms.is_finite() || delta_t_ms == 0.0 || delta_t_ms.abs() > STDP_WINDOW_MS {
        return 0.0;
    }
    let magnitude = learning_rate * (-delta_t_ms.abs() / STDP_TAU_MS).exp();
    if delta_t_ms > 0.0 {
        magnitude
    } else {
        -LTD_ASYMMETRY * magnitude
    }
}
