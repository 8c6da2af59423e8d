//! Chaos: concurrent load across subsystems
//!
//! Threads hammering registration, queries, releases, patrols, and
//! births at once. These tests assert invariants, not schedules: counts
//! reconcile, concentrations stay non-negative, nothing deadlocks.

use std::sync::Arc;
use std::thread;

use neuropil_e2e_tests::harness::TestCoreManager;
use neuropil_core::{
    BirthPriority, ComponentRecord, ComponentType, CoordinationConfig, CoreError, LigandType,
    Position3D,
};

#[test]
fn concurrent_register_query_unregister() {
    let manager = Arc::new(TestCoreManager::new());
    let threads: usize = 8;
    let per_thread: usize = 150;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let id = format!("c{t}-{i}");
                    let pos = Position3D::new((t * 70) as f64, i as f64, 0.0);
                    manager
                        .core
                        .register_component(ComponentRecord::new(
                            &id,
                            ComponentType::Neuron,
                            pos,
                        ))
                        .unwrap();
                    // Interleave queries with writes from other threads
                    let _ = manager.core.find_nearby(pos, 30.0);
                    if i % 3 == 0 {
                        manager.core.unregister_component(&id);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let expected = threads * per_thread - threads * per_thread.div_ceil(3);
    assert_eq!(manager.core.component_count(), expected);
    // I3: the grid tracks the registry exactly
    assert_eq!(
        manager.core.registry().grid_len(),
        manager.core.component_count()
    );
}

#[test]
fn concurrent_release_and_tick() {
    let manager = Arc::new(TestCoreManager::new());
    let releasers: Vec<_> = (0..4)
        .map(|t| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let mut limited = 0;
                for i in 0..200 {
                    let result = manager.core.release_chemical(
                        LigandType::Dopamine,
                        &format!("src-{t}"),
                        Position3D::new((i % 10) as f64 * 5.0, 0.0, 0.0),
                        1.0,
                    );
                    match result {
                        Ok(()) | Err(CoreError::RateLimited(_)) => {
                            if result.is_err() {
                                limited += 1;
                            }
                        }
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
                limited
            })
        })
        .collect();
    let ticker = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for _ in 0..50 {
                manager.core.tick_fields(0.01);
            }
        })
    };

    for handle in releasers {
        // 200 releases against a 100/s window: some must be limited
        assert!(handle.join().unwrap() > 0);
    }
    ticker.join().unwrap();

    // I4 under contention
    for x in [0.0, 20.0, 45.0] {
        let c = manager
            .core
            .get_concentration(LigandType::Dopamine, Position3D::new(x, 0.0, 0.0));
        assert!(c >= 0.0 && c.is_finite());
    }
}

#[test]
fn concurrent_patrols_and_health_updates() {
    let manager = Arc::new(TestCoreManager::new());
    for i in 0..40 {
        manager.register_neuron(&format!("n{i}"), (i % 10) as f64 * 8.0, (i / 10) as f64 * 8.0, 0.0);
    }
    for m in 0..4 {
        manager
            .core
            .establish_patrol_route(
                &format!("m{m}"),
                Position3D::new((m * 20) as f64, 0.0, 0.0),
                60.0,
                None,
            )
            .unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|m| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for _ in 0..10 {
                    manager.core.execute_patrol(&format!("m{m}")).unwrap();
                }
            })
        })
        .collect();
    let updater = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for round in 0..10 {
                for i in 0..40 {
                    manager.core.update_component_health(
                        &format!("n{i}"),
                        (round as f64) / 10.0,
                        i % 5,
                    );
                }
            }
        })
    };
    for handle in handles {
        handle.join().unwrap();
    }
    updater.join().unwrap();

    // Every component is tracked with a bounded score
    for i in 0..40 {
        let health = manager.core.get_component_health(&format!("n{i}")).unwrap();
        assert!((0.0..=1.0).contains(&health.health_score));
        assert!(health.patrol_count >= 10);
    }
}

#[test]
fn births_respect_capacity_under_racing_processors() {
    let mut config = CoordinationConfig::default();
    config.resources.max_components = 20;
    config.resources.high_priority_bypass = false;
    let manager = Arc::new(TestCoreManager::with_config(config));

    for _ in 0..60 {
        manager.core.request_birth(
            ComponentType::Neuron,
            Position3D::ORIGIN,
            "growth",
            BirthPriority::Medium,
            "chaos",
        );
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.core.process_births().len())
        })
        .collect();
    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    // I6: racing processors never oversubscribe without the bypass
    assert_eq!(admitted, 20);
    assert_eq!(manager.core.component_count(), 20);
}
