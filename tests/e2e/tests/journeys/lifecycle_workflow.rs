//! Journey: birth gating, patrol, health, pruning
//!
//! The full microglial loop: capacity-gated creation with the emergency
//! bypass, a patrol that feeds the health monitor, and pruning driven by
//! what the patrol found.

use std::time::Duration;

use neuropil_e2e_tests::harness::TestCoreManager;
use neuropil_core::{
    BirthPriority, ComponentType, CoordinationConfig, Position3D, SurveillanceState,
};

#[test]
fn emergency_birth_bypasses_capacity() {
    let manager = TestCoreManager::with_capacity(5);
    for i in 0..5 {
        manager.register_neuron(&format!("n{i}"), i as f64 * 10.0, 0.0, 0.0);
    }

    // Low priority at capacity: rejected and retained
    manager.core.request_birth(
        ComponentType::Neuron,
        Position3D::new(60.0, 0.0, 0.0),
        "routine growth",
        BirthPriority::Low,
        "tester",
    );
    assert!(manager.core.process_births().is_empty());
    assert_eq!(manager.core.component_count(), 5);

    // High priority at capacity: admitted through the bypass
    manager.core.request_birth(
        ComponentType::Microglia,
        Position3D::new(70.0, 0.0, 0.0),
        "injury response",
        BirthPriority::High,
        "tester",
    );
    let created = manager.core.process_births();
    assert_eq!(created.len(), 1);
    assert_eq!(manager.core.component_count(), 6);

    // The low-priority request is still waiting
    assert_eq!(manager.core.lifecycle().birth.pending_count(), 1);
}

#[test]
fn freed_capacity_admits_waiting_requests() {
    let manager = TestCoreManager::with_capacity(2);
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    manager.register_neuron("n2", 10.0, 0.0, 0.0);

    manager.core.request_birth(
        ComponentType::Neuron,
        Position3D::new(20.0, 0.0, 0.0),
        "waiting",
        BirthPriority::Medium,
        "tester",
    );
    assert!(manager.core.process_births().is_empty());

    manager.core.remove_component("n1");
    let created = manager.core.process_births();
    assert_eq!(created.len(), 1);
    assert_eq!(manager.core.component_count(), 2);
}

#[test]
fn patrol_feeds_health_and_surfaces_issues() {
    let manager = TestCoreManager::new();
    // Isolated neurons inside the route, one connected pair outside
    manager.register_neuron("lonely1", 0.0, 0.0, 0.0);
    manager.register_neuron("lonely2", 10.0, 0.0, 0.0);
    manager.register_neuron("far", 400.0, 0.0, 0.0);

    manager
        .core
        .establish_patrol_route("m1", Position3D::ORIGIN, 50.0, None)
        .unwrap();

    let report = manager.core.execute_patrol("m1").unwrap();
    assert_eq!(report.components_checked, 2);
    assert!(report.issues_found > 0);

    // Health records exist for patrolled components only
    let health = manager.core.get_component_health("lonely1").unwrap();
    assert_eq!(health.patrol_count, 1);
    assert_eq!(health.state, SurveillanceState::IssueFlagged);
    assert!(manager.core.get_component_health("far").is_none());
}

#[test]
fn repeated_patrols_mark_persistent_inactivity() {
    let mut config = CoordinationConfig::default();
    // Patrols report the synthetic default activity; set it below the
    // consistency threshold so sustained observation flags persistence
    config.patrol.default_activity = 0.05;
    let manager = TestCoreManager::with_config(config);

    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    manager
        .core
        .establish_patrol_route("m1", Position3D::ORIGIN, 50.0, None)
        .unwrap();

    for _ in 0..7 {
        manager.core.execute_patrol("m1").unwrap();
    }

    let health = manager.core.get_component_health("n1").unwrap();
    assert_eq!(health.state, SurveillanceState::PersistentlyInactive);
    assert_eq!(health.patrol_count, 7);
}

#[test]
fn pruning_flows_from_mark_to_registry() {
    let mut config = CoordinationConfig::default();
    config.pruning.age_threshold = Duration::ZERO;
    config.pruning.score_threshold = 0.5;
    let manager = TestCoreManager::with_config(config);

    manager.register_neuron("pre", 0.0, 0.0, 0.0);
    manager.register_neuron("post", 10.0, 0.0, 0.0);
    manager
        .core
        .record_synaptic_activity("s1", "pre", "post", 0.3)
        .unwrap();

    // A silent connection between close, equally idle endpoints scores
    // above the lowered threshold
    let target = manager.core.mark_for_pruning("s1", "pre", "post", 0.0);
    assert!(target.score > 0.5, "score {}", target.score);
    assert_eq!(manager.core.get_pruning_candidates().len(), 1);

    let pruned = manager.core.execute_pruning();
    assert_eq!(pruned, vec!["s1".to_string()]);
    assert!(manager.core.get_synaptic_info("s1").is_none());
    assert!(manager.core.get_pruning_candidates().is_empty());
}

#[test]
fn fresh_marks_respect_the_age_gate() {
    // Default config: 24 h age threshold
    let manager = TestCoreManager::new();
    manager.register_neuron("pre", 0.0, 0.0, 0.0);
    manager.register_neuron("post", 10.0, 0.0, 0.0);

    manager.core.mark_for_pruning("s1", "pre", "post", 0.0);
    assert!(manager.core.execute_pruning().is_empty());
    assert_eq!(manager.core.get_pruning_candidates().len(), 1);
}

#[test]
fn removing_component_drops_lifecycle_state() {
    let manager = TestCoreManager::new();
    manager.register_neuron("n1", 0.0, 0.0, 0.0);
    manager.register_neuron("n2", 10.0, 0.0, 0.0);
    manager.core.update_component_health("n1", 0.5, 1);
    manager.core.mark_for_pruning("c1", "n1", "n2", 0.2);
    manager
        .core
        .establish_patrol_route("n1", Position3D::ORIGIN, 50.0, None)
        .unwrap();

    manager.core.remove_component("n1");

    assert!(manager.core.get_component_health("n1").is_none());
    assert!(manager.core.get_pruning_candidates().is_empty());
    assert!(manager.core.lifecycle().patrol.get_route("n1").is_none());
    let stats = manager.core.stats();
    assert_eq!(stats.registry.component_count, 1);
}
