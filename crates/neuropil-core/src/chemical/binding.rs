//! Receptor Binding Targets
//!
//! Neurons and glia that want chemical input register a binding target
//! declaring which ligands their receptors accept. Release fan-out is
//! synchronous: `on_bind` runs inside the releasing call, so
//! implementations must do bounded work and must never call back into the
//! chemical field from the same call chain.

use super::ligand::LigandType;

/// A receptor-bearing component able to receive ligand deliveries.
pub trait BindingTarget: Send + Sync {
    /// Component id of the target
    fn id(&self) -> &str;

    /// Ligand species this target's receptors accept
    fn receptors(&self) -> Vec<LigandType>;

    /// Deliver a binding event.
    ///
    /// `concentration` is the released amount scaled by the ligand's
    /// binding affinity. Called synchronously from `release`; bounded work
    /// only, no re-entry into the field.
    fn on_bind(&self, ligand: LigandType, source_id: &str, concentration: f64);
}
