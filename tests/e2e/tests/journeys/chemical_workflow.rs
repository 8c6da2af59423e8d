//! Journey: chemical release, diffusion, pharmacology
//!
//! The SSRI scenario, rate limiting under pressure, range separation
//! between species, and receptor fan-out - the chemical field end to end.

use neuropil_e2e_tests::harness::TestCoreManager;
use neuropil_e2e_tests::mocks::RecordingBindingTarget;
use neuropil_core::{CoordinationConfig, CoreError, LigandType, Position3D};

#[test]
fn ssri_pharmacology_raises_residual_serotonin() {
    let origin = Position3D::ORIGIN;

    // Baseline: release 5 uM, let 200 ms of simulated time pass
    let baseline = TestCoreManager::new();
    baseline
        .core
        .release_chemical(LigandType::Serotonin, "n1", origin, 5.0)
        .unwrap();
    baseline.core.tick_fields(0.2);
    let c0 = baseline.core.get_concentration(LigandType::Serotonin, origin);
    assert!(c0 > 0.0);

    // Treated: clearance reduced to 10% of default, same protocol
    let treated = TestCoreManager::new();
    treated
        .core
        .field()
        .scale_clearance(LigandType::Serotonin, 0.1);
    treated
        .core
        .release_chemical(LigandType::Serotonin, "n1", origin, 5.0)
        .unwrap();
    treated.core.tick_fields(0.2);
    let c1 = treated.core.get_concentration(LigandType::Serotonin, origin);

    let ratio = c1 / c0;
    assert!(
        (1.5..=8.0).contains(&ratio),
        "SSRI ratio {ratio:.2} outside the expected 1.5-8.0 band"
    );
}

#[test]
fn rate_limiting_under_pressure() {
    let mut config = CoordinationConfig::default();
    config.resources.max_release_rate = 50;
    let manager = TestCoreManager::with_config(config);

    let mut rejected = 0;
    for _ in 0..100 {
        match manager
            .core
            .release_chemical(LigandType::Glutamate, "n1", Position3D::ORIGIN, 0.5)
        {
            Ok(()) => {}
            Err(CoreError::RateLimited(source)) => {
                assert_eq!(source, "n1");
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert!(rejected >= 50, "only {rejected} releases were limited");
}

#[test]
fn ligand_ranges_separate_species() {
    let manager = TestCoreManager::new();
    let origin = Position3D::ORIGIN;

    manager
        .core
        .release_chemical(LigandType::Glutamate, "src-a", origin, 5.0)
        .unwrap();
    manager
        .core
        .release_chemical(LigandType::Dopamine, "src-b", origin, 5.0)
        .unwrap();

    // 40 um: beyond glutamate's range, inside dopamine's
    let probe = Position3D::new(40.0, 0.0, 0.0);
    assert_eq!(
        manager.core.get_concentration(LigandType::Glutamate, probe),
        0.0
    );
    assert!(manager.core.get_concentration(LigandType::Dopamine, probe) > 0.0);
}

#[test]
fn concentration_never_negative_through_lifecycle() {
    let manager = TestCoreManager::new();

    for i in 0..5 {
        manager
            .core
            .release_chemical(
                LigandType::Dopamine,
                &format!("src-{i}"),
                Position3D::new(i as f64 * 10.0, 0.0, 0.0),
                2.0,
            )
            .unwrap();
        manager.core.tick_fields(0.5);
    }
    for _ in 0..50 {
        manager.core.tick_fields(1.0);
    }

    for x in [0.0, 25.0, 50.0, 500.0] {
        let c = manager
            .core
            .get_concentration(LigandType::Dopamine, Position3D::new(x, 0.0, 0.0));
        assert!(c >= 0.0 && c.is_finite(), "c({x}) = {c}");
    }
}

#[test]
fn release_is_visible_before_return() {
    let manager = TestCoreManager::new();
    let origin = Position3D::new(7.0, 7.0, 7.0);
    manager
        .core
        .release_chemical(LigandType::Acetylcholine, "n1", origin, 3.0)
        .unwrap();
    // Strong visibility: the full released amount is readable at the origin
    let c = manager
        .core
        .get_concentration(LigandType::Acetylcholine, origin);
    assert!((c - 3.0).abs() < 1e-9);
}

#[test]
fn receptor_fan_out_delivers_synchronously() {
    let manager = TestCoreManager::new();
    let target = RecordingBindingTarget::new(
        "n2",
        vec![LigandType::Glutamate, LigandType::Dopamine],
    );
    manager.core.register_binding_target(target.clone());

    manager
        .core
        .release_chemical(LigandType::Glutamate, "n1", Position3D::ORIGIN, 2.0)
        .unwrap();
    manager
        .core
        .release_chemical(LigandType::Serotonin, "n1", Position3D::ORIGIN, 2.0)
        .unwrap();

    // Only the glutamate release matches the receptor set
    let deliveries = target.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].ligand, LigandType::Glutamate);
    assert_eq!(deliveries[0].source_id, "n1");
    assert!(deliveries[0].concentration > 0.0);
}

#[tokio::test]
async fn background_tickers_drive_decay() {
    let manager = TestCoreManager::new();
    manager
        .core
        .release_chemical(LigandType::Glutamate, "n1", Position3D::ORIGIN, 10.0)
        .unwrap();

    let handle = manager
        .core
        .start_field_tickers_at(std::time::Duration::from_millis(5));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    drop(handle);

    let c = manager
        .core
        .get_concentration(LigandType::Glutamate, Position3D::ORIGIN);
    assert!(c < 10.0, "background decay should have run, c = {c}");
}
