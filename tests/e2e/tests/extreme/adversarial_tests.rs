//! Adversarial inputs
//!
//! NaN and infinite numbers, empty ids, pathological radii, and hostile
//! call orders. The contract: structural errors surface, numeric nonsense
//! is recovered conservatively, and no input corrupts an invariant.

use neuropil_e2e_tests::harness::TestCoreManager;
use neuropil_core::{
    ComponentRecord, ComponentType, CoreError, LigandKinetics, LigandType, Position3D,
};

#[test]
fn empty_ids_are_rejected_where_structural() {
    let manager = TestCoreManager::new();
    assert_eq!(
        manager.core.register_component(ComponentRecord::new(
            "",
            ComponentType::Neuron,
            Position3D::ORIGIN
        )),
        Err(CoreError::EmptyId)
    );
    assert_eq!(
        manager
            .core
            .release_chemical(LigandType::Glutamate, "", Position3D::ORIGIN, 1.0),
        Err(CoreError::EmptyId)
    );
    assert_eq!(
        manager
            .core
            .establish_territory("", Position3D::ORIGIN, 10.0),
        Err(CoreError::EmptyId)
    );
}

#[test]
fn nan_position_component_is_still_addressable() {
    let manager = TestCoreManager::new();
    let record = ComponentRecord::new(
        "weird",
        ComponentType::Neuron,
        Position3D::new(f64::NAN, f64::INFINITY, 0.0),
    );
    manager.core.register_component(record).unwrap();

    // Retrievable by id with its original coordinates preserved
    let stored = manager.core.get_component("weird").unwrap();
    assert!(stored.position.x.is_nan());
    assert!(stored.position.y.is_infinite());

    // Indexed at the normalised origin cell, and removable
    assert_eq!(manager.core.component_count(), 1);
    manager.core.unregister_component("weird");
    assert_eq!(manager.core.component_count(), 0);
    assert_eq!(manager.core.registry().grid_len(), 0);
}

#[test]
fn pathological_query_radii_return_promptly() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);

    // Enormous, tiny, zero, negative, and non-finite radii all answer
    assert_eq!(manager.core.find_nearby(Position3D::ORIGIN, 1e15).len(), 1);
    assert_eq!(manager.core.find_nearby(Position3D::ORIGIN, 1e-15).len(), 1);
    assert_eq!(manager.core.find_nearby(Position3D::ORIGIN, 0.0).len(), 1);
    assert_eq!(manager.core.find_nearby(Position3D::ORIGIN, f64::NAN).len(), 1);

    // A negative radius through criteria means no spatial filter
    let all = manager.core.find(&neuropil_core::FindCriteria {
        position: Some(Position3D::new(999.0, 0.0, 0.0)),
        radius: Some(-5.0),
        ..Default::default()
    });
    assert_eq!(all.len(), 1);
}

#[test]
fn health_and_pruning_swallow_numeric_nonsense() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    manager.register_neuron("n2", 10.0, 0.0, 0.0);

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -7.0, 42.0] {
        let health = manager.core.update_component_health("n1", bad, 3);
        assert!(health.health_score.is_finite());
        assert!((0.0..=1.0).contains(&health.health_score));

        let target = manager.core.mark_for_pruning("c1", "n1", "n2", bad);
        assert!(target.score.is_finite());
        assert!((0.0..=1.0).contains(&target.score));
    }

    // Empty-id marks get the moderate default, not a crash
    let target = manager.core.mark_for_pruning("", "", "", f64::NAN);
    assert_eq!(target.score, 0.5);
}

#[test]
fn chemical_field_survives_hostile_kinetics() {
    let manager = TestCoreManager::new();
    manager.core.set_kinetics(
        LigandType::Dopamine,
        LigandKinetics {
            diffusion_rate: f64::NAN,
            clearance_rate: f64::NEG_INFINITY,
            decay_rate: -1.0,
            binding_affinity: 99.0,
            max_range: f64::INFINITY,
        },
    );

    manager
        .core
        .release_chemical(LigandType::Dopamine, "n1", Position3D::ORIGIN, 5.0)
        .unwrap();
    manager.core.tick_fields(1.0);

    let c = manager
        .core
        .get_concentration(LigandType::Dopamine, Position3D::ORIGIN);
    assert!(c.is_finite() && c >= 0.0);
}

#[test]
fn non_finite_release_amounts_deposit_nothing() {
    let manager = TestCoreManager::new();
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -5.0] {
        manager
            .core
            .release_chemical(LigandType::Serotonin, "n1", Position3D::ORIGIN, bad)
            .unwrap();
    }
    assert_eq!(
        manager
            .core
            .get_concentration(LigandType::Serotonin, Position3D::ORIGIN),
        0.0
    );
}

#[test]
fn unknown_ids_fail_writes_and_miss_reads() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);

    // Write paths surface structural errors
    assert!(matches!(
        manager.core.map_connection("n1", "ghost"),
        Err(CoreError::UnknownComponent(_))
    ));
    assert!(matches!(
        manager
            .core
            .record_synaptic_activity("s1", "ghost", "n1", 0.5),
        Err(CoreError::UnknownComponent(_))
    ));

    // Read paths miss silently
    assert!(manager.core.get_component("ghost").is_none());
    assert!(manager.core.get_connections("ghost").is_empty());
    assert!(manager.core.get_synaptic_info("ghost").is_none());
    manager.core.unregister_component("ghost");
}

#[test]
fn double_removal_is_idempotent() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    assert!(manager.core.remove_component("n1"));
    assert!(!manager.core.remove_component("n1"));
    assert_eq!(manager.core.component_count(), 0);
}
