//! Journey: register, query, unregister
//!
//! The registry's bread and butter: components appear in proximity
//! queries the moment they are registered, and every trace of them is
//! gone the moment they are not.

use neuropil_e2e_tests::harness::TestCoreManager;
use neuropil_core::{ComponentType, FindCriteria, Position3D};

#[test]
fn register_query_unregister_roundtrip() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    manager.register_neuron("n2", 10.0, 0.0, 0.0);
    manager.register_neuron("n3", 100.0, 0.0, 0.0);

    assert_eq!(
        manager.nearby_ids(Position3D::ORIGIN, 20.0),
        vec!["n1".to_string(), "n2".to_string()]
    );

    manager.core.unregister_component("n2");

    assert_eq!(
        manager.nearby_ids(Position3D::ORIGIN, 20.0),
        vec!["n1".to_string()]
    );
    assert_eq!(manager.core.component_count(), 2);
}

#[test]
fn connection_cleanup_on_unregister() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    manager.register_neuron("n2", 10.0, 0.0, 0.0);
    manager.register_neuron("n3", 20.0, 0.0, 0.0);

    manager.core.map_connection("n1", "n2").unwrap();
    manager.core.map_connection("n1", "n3").unwrap();

    manager.core.unregister_component("n2");

    assert_eq!(manager.core.get_connections("n1"), vec!["n3".to_string()]);
}

#[test]
fn synaptic_record_follows_endpoints() {
    let manager = TestCoreManager::new();
    manager.register_neuron("pre", 0.0, 0.0, 0.0);
    manager.register_neuron("post", 10.0, 0.0, 0.0);

    manager
        .core
        .record_synaptic_activity("s1", "pre", "post", 0.6)
        .unwrap();

    let info = manager.core.get_synaptic_info("s1").unwrap();
    assert_eq!(info.strength, 0.6);
    assert_eq!(info.activity_count, 1);
    assert!(manager
        .core
        .get_connections("pre")
        .contains(&"post".to_string()));

    // Removing an endpoint removes the record and the edge
    manager.core.unregister_component("post");
    assert!(manager.core.get_synaptic_info("s1").is_none());
    assert!(manager.core.get_connections("pre").is_empty());
}

#[test]
fn find_combines_type_and_space() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    manager
        .core
        .register_component(neuropil_core::ComponentRecord::new(
            "a1",
            ComponentType::Astrocyte,
            Position3D::new(5.0, 0.0, 0.0),
        ))
        .unwrap();

    let neurons_near = manager.core.find(&FindCriteria {
        component_type: Some(ComponentType::Neuron),
        position: Some(Position3D::ORIGIN),
        radius: Some(50.0),
        ..Default::default()
    });
    assert_eq!(neurons_near.len(), 1);
    assert_eq!(neurons_near[0].id, "n1");

    let astrocytes = manager.core.find_by_type(ComponentType::Astrocyte);
    assert_eq!(astrocytes.len(), 1);
}

#[test]
fn reregistration_moves_the_component() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    // Same id, new position: idempotent replacement with grid migration
    manager.register_neuron("n1", 300.0, 0.0, 0.0);

    assert_eq!(manager.core.component_count(), 1);
    assert!(manager.nearby_ids(Position3D::ORIGIN, 20.0).is_empty());
    assert_eq!(
        manager.nearby_ids(Position3D::new(300.0, 0.0, 0.0), 20.0),
        vec!["n1".to_string()]
    );
}
