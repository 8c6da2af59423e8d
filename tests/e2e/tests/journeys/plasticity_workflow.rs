//! Journey: plasticity dispatch
//!
//! Weight setting and STDP through the dispatcher, with the downstream
//! effects visible everywhere they should be: the synaptic record, the
//! health observation, and the calcium field.

use neuropil_e2e_tests::harness::TestCoreManager;
use neuropil_e2e_tests::mocks::MockSynapse;
use neuropil_core::{CoreError, LigandType, PlasticityAdjustment, Position3D, Synapse};

fn wired_manager() -> (TestCoreManager, std::sync::Arc<MockSynapse>) {
    let manager = TestCoreManager::new();
    manager.register_neuron("pre", 0.0, 0.0, 0.0);
    manager.register_neuron("post", 20.0, 0.0, 0.0);
    let synapse = MockSynapse::new("pre", "post", 0.5);
    manager
        .core
        .register_synapse("s1", synapse.clone())
        .unwrap();
    (manager, synapse)
}

#[test]
fn set_weight_updates_every_view() {
    let (manager, synapse) = wired_manager();

    let applied = manager.core.set_synapse_weight("s1", 0.9).unwrap();
    assert!((applied - 0.4).abs() < 1e-12);
    assert_eq!(synapse.get_weight(), 0.9);

    // Synaptic record reflects the new weight and the edge exists
    let record = manager.core.get_synaptic_info("s1").unwrap();
    assert_eq!(record.strength, 0.9);
    assert!(manager
        .core
        .get_connections("pre")
        .contains(&"post".to_string()));

    // The pre-synaptic component picked up a health observation
    assert!(manager.core.get_component_health("pre").is_some());

    // |dw| = 0.4 > 0.01: calcium released at the synapse midpoint
    let midpoint = Position3D::new(10.0, 0.0, 0.0);
    let calcium = manager.core.get_concentration(LigandType::Calcium, midpoint);
    assert!((calcium - 4.0).abs() < 1e-9, "calcium = {calcium}");
}

#[test]
fn stdp_window_shapes_the_change() {
    let (manager, synapse) = wired_manager();

    // Pre fires 10 ms before post: potentiation
    let ltp = manager
        .core
        .apply_plasticity(
            "s1",
            PlasticityAdjustment::Stdp {
                delta_t_ms: 10.0,
                learning_rate: 0.05,
            },
        )
        .unwrap();
    assert!(ltp > 0.0);

    // Post fires 10 ms before pre: depression, slightly stronger
    let ltd = manager
        .core
        .apply_plasticity(
            "s1",
            PlasticityAdjustment::Stdp {
                delta_t_ms: -10.0,
                learning_rate: 0.05,
            },
        )
        .unwrap();
    assert!(ltd < 0.0);
    assert!(ltd.abs() > ltp.abs());

    // Outside the 100 ms window but inside validation bounds: no change
    let outside = manager
        .core
        .apply_plasticity(
            "s1",
            PlasticityAdjustment::Stdp {
                delta_t_ms: 150.0,
                learning_rate: 0.05,
            },
        )
        .unwrap();
    assert_eq!(outside, 0.0);

    assert_eq!(synapse.events().len(), 3);
}

#[test]
fn invalid_adjustments_are_rejected() {
    let (manager, synapse) = wired_manager();

    assert!(matches!(
        manager.core.apply_plasticity(
            "s1",
            PlasticityAdjustment::Stdp {
                delta_t_ms: 201.0,
                learning_rate: 0.05
            }
        ),
        Err(CoreError::InvalidAdjustment(_))
    ));
    assert!(matches!(
        manager.core.apply_plasticity(
            "s1",
            PlasticityAdjustment::Stdp {
                delta_t_ms: 10.0,
                learning_rate: 0.2
            }
        ),
        Err(CoreError::InvalidAdjustment(_))
    ));
    assert!(matches!(
        manager.core.set_synapse_weight("s1", -0.5),
        Err(CoreError::InvalidAdjustment(_))
    ));

    // Nothing reached the collaborator
    assert!(synapse.events().is_empty());
    assert_eq!(synapse.get_weight(), 0.5);
}

#[test]
fn direct_adjustment_passes_through() {
    let (manager, synapse) = wired_manager();
    manager
        .core
        .apply_plasticity("s1", PlasticityAdjustment::Direct { weight_change: 0.25 })
        .unwrap();
    assert!((synapse.get_weight() - 0.75).abs() < 1e-12);
    assert_eq!(
        manager.core.get_synaptic_info("s1").unwrap().strength,
        synapse.get_weight()
    );
}

#[test]
fn unknown_synapse_is_an_error() {
    let manager = TestCoreManager::new();
    assert_eq!(
        manager.core.set_synapse_weight("ghost", 1.0),
        Err(CoreError::UnknownSynapse("ghost".into()))
    );
}
