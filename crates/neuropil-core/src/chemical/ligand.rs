//! Ligand Species and Kinetics
//!
//! Each ligand carries its own transport parameters. The defaults follow
//! the broad strokes of volume transmission (Fuxe & Agnati): synaptically
//! confined transmitters like glutamate act over a few micrometres and are
//! cleared within milliseconds by transporters, while neuromodulators like
//! dopamine escape the cleft and act over tens to hundreds of micrometres
//! with slow clearance.

use serde::{Deserialize, Serialize};

// ============================================================================
// LIGAND TYPES
// ============================================================================

/// Chemical species carried by the concentration field
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LigandType {
    /// Primary excitatory transmitter; tightly cleft-confined
    #[default]
    Glutamate,
    /// Primary inhibitory transmitter
    #[serde(rename = "gaba")]
    Gaba,
    /// Volume-transmitting neuromodulator, long range, slow clearance
    Dopamine,
    /// Volume-transmitting neuromodulator; clearance is the SSRI target
    Serotonin,
    /// Cleared rapidly by acetylcholinesterase
    Acetylcholine,
    /// Intracellular signalling proxy used by plasticity reporting
    Calcium,
}

impl LigandType {
    /// All built-in ligand species
    pub const ALL: [LigandType; 6] = [
        LigandType::Glutamate,
        LigandType::Gaba,
        LigandType::Dopamine,
        LigandType::Serotonin,
        LigandType::Acetylcholine,
        LigandType::Calcium,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LigandType::Glutamate => "glutamate",
            LigandType::Gaba => "gaba",
            LigandType::Dopamine => "dopamine",
            LigandType::Serotonin => "serotonin",
            LigandType::Acetylcholine => "acetylcholine",
            LigandType::Calcium => "calcium",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "glutamate" => Some(LigandType::Glutamate),
            "gaba" => Some(LigandType::Gaba),
            "dopamine" => Some(LigandType::Dopamine),
            "serotonin" => Some(LigandType::Serotonin),
            "acetylcholine" => Some(LigandType::Acetylcholine),
            "calcium" => Some(LigandType::Calcium),
            _ => None,
        }
    }
}

impl std::fmt::Display for LigandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// KINETICS
// ============================================================================

/// Per-ligand transport and binding parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LigandKinetics {
    /// Spatial spread factor; scales the diffusion length as a fraction of
    /// `max_range` (dimensionless, > 0)
    pub diffusion_rate: f64,
    /// Transporter/enzymatic removal rate (1/s). Pharmacology modulates
    /// this independently of decay.
    pub clearance_rate: f64,
    /// Intrinsic breakdown rate (1/s)
    pub decay_rate: f64,
    /// Fraction of local concentration delivered to a bound receptor (0..=1)
    pub binding_affinity: f64,
    /// Hard range limit (um); contributions are zero beyond it
    pub max_range: f64,
}

impl LigandKinetics {
    /// Biologically motivated defaults for a ligand species
    pub fn defaults_for(ligand: LigandType) -> Self {
        match ligand {
            // Cleft-confined, EAAT-cleared within ~1 ms
            LigandType::Glutamate => Self {
                diffusion_rate: 0.4,
                clearance_rate: 50.0,
                decay_rate: 1.0,
                binding_affinity: 0.85,
                max_range: 5.0,
            },
            LigandType::Gaba => Self {
                diffusion_rate: 0.4,
                clearance_rate: 30.0,
                decay_rate: 1.0,
                binding_affinity: 0.8,
                max_range: 8.0,
            },
            // Escapes the cleft; DAT reuptake is slow relative to release
            LigandType::Dopamine => Self {
                diffusion_rate: 0.6,
                clearance_rate: 0.5,
                decay_rate: 0.05,
                binding_affinity: 0.9,
                max_range: 100.0,
            },
            // SERT reuptake dominates removal; blocking it (SSRI) multiplies
            // the residual concentration within a few hundred milliseconds
            LigandType::Serotonin => Self {
                diffusion_rate: 0.6,
                clearance_rate: 5.0,
                decay_rate: 0.05,
                binding_affinity: 0.9,
                max_range: 80.0,
            },
            // AChE hydrolysis is among the fastest known enzymes
            LigandType::Acetylcholine => Self {
                diffusion_rate: 0.5,
                clearance_rate: 80.0,
                decay_rate: 2.0,
                binding_affinity: 0.75,
                max_range: 20.0,
            },
            LigandType::Calcium => Self {
                diffusion_rate: 0.5,
                clearance_rate: 5.0,
                decay_rate: 0.5,
                binding_affinity: 1.0,
                max_range: 15.0,
            },
        }
    }

    /// Copy with non-finite or out-of-range fields replaced by the
    /// species defaults. Keeps invariant I4 unviolable via configuration.
    pub fn sanitized(&self, ligand: LigandType) -> Self {
        let defaults = Self::defaults_for(ligand);
        fn pick(value: f64, min: f64, fallback: f64) -> f64 {
            if value.is_finite() && value > min { value } else { fallback }
        }
        Self {
            diffusion_rate: pick(self.diffusion_rate, 0.0, defaults.diffusion_rate),
            clearance_rate: pick(self.clearance_rate, -f64::EPSILON, defaults.clearance_rate),
            decay_rate: pick(self.decay_rate, -f64::EPSILON, defaults.decay_rate),
            binding_affinity: if self.binding_affinity.is_finite() {
                self.binding_affinity.clamp(0.0, 1.0)
            } else {
                defaults.binding_affinity
            },
            max_range: pick(self.max_range, 0.0, defaults.max_range),
        }
    }
}

impl Default for LigandKinetics {
    fn default() -> Self {
        Self::defaults_for(LigandType::Glutamate)
    }
}
