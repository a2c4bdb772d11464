//! Integration tests for kinefem-bench.

use kinefem_bench::metrics::BenchmarkMetrics;
use kinefem_bench::runner::BenchmarkRunner;
use kinefem_bench::scenarios::{Scenario, ScenarioKind};
use kinefem_material::MaterialDatabase;
use kinefem_solver::{EulerImplicitLinearized, StepperConfig};

fn sample_metrics(scenario: &str) -> BenchmarkMetrics {
    BenchmarkMetrics {
        scenario: scenario.into(),
        dofs: 96,
        constraints: 4,
        timesteps: 100,
        total_wall_time: 1.5,
        avg_step_time: 0.015,
        min_step_time: 0.01,
        max_step_time: 0.02,
        final_kinetic_energy: 1e-5,
        final_elastic_energy: 2e-4,
        max_violation: 3e-7,
        max_displacement: 0.5,
        avg_iterations: 1.0,
    }
}

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn all_scenarios_listed() {
    assert_eq!(ScenarioKind::all().len(), 4);
    for &kind in ScenarioKind::all() {
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
        assert_eq!(Scenario::from_kind(kind).kind, kind);
    }
    assert_eq!(ScenarioKind::from_name("hanging_sheet"), None);
}

#[test]
fn differential_setup() {
    let model = Scenario::differential().build_model().unwrap();
    assert_eq!(model.constraint_count(), 1);
    assert_eq!(model.state.shafts.len(), 3);
    assert!(model.state.shafts[0].fixed);
    assert!(model.state.shafts[1].fixed);
    assert!(!model.state.shafts[2].fixed);
}

#[test]
fn tet_column_setup() {
    let scenario = Scenario::tet_column();
    assert_eq!(scenario.material.as_ref().map(|m| m.name.as_str()), Some("rubber"));
    let model = scenario.build_model().unwrap();
    // 2×2 vertices per level, nine levels, six tets per cell
    assert_eq!(model.state.nodes.len(), 36);
    assert_eq!(model.element_count(), 48);
    let fixed = model.state.nodes.iter().filter(|n| n.fixed).count();
    assert_eq!(fixed, 4);
}

#[test]
fn tet_column_without_material_fails() {
    let mut scenario = Scenario::tet_column();
    scenario.material = None;
    assert!(scenario.build_model().is_err());
}

#[test]
fn material_override() {
    let db = MaterialDatabase::with_defaults();
    let steel = db.get("steel").unwrap().clone();
    let scenario = Scenario::tet_column().with_material(steel);
    assert_eq!(scenario.material.map(|m| m.name), Some("steel".to_string()));
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_differential() {
    let mut scenario = Scenario::differential();
    scenario.timesteps = 10;
    let mut solver = EulerImplicitLinearized::new(scenario.config.clone()).unwrap();
    let metrics = BenchmarkRunner::run(&scenario, &mut solver).unwrap();

    assert_eq!(metrics.scenario, "differential");
    assert_eq!(metrics.timesteps, 10);
    assert_eq!(metrics.dofs, 1);
    assert_eq!(metrics.constraints, 1);
    assert!((metrics.avg_iterations - 1.0).abs() < 1e-12);
    // Driven and free shaft both spin at 5 rad/s with unit inertia.
    assert!((metrics.final_kinetic_energy - 25.0).abs() < 1e-4);
}

#[test]
fn run_slider_moves_body() {
    let mut scenario = Scenario::revolute_translational();
    scenario.timesteps = 20;
    let mut solver = EulerImplicitLinearized::new(scenario.config.clone()).unwrap();
    let metrics = BenchmarkRunner::run(&scenario, &mut solver).unwrap();
    assert_eq!(metrics.constraints, 4);
    assert!(metrics.max_displacement > 0.0);
    assert!(metrics.max_violation < 1e-3);
}

#[test]
fn run_all_scenarios_short() {
    for &kind in ScenarioKind::all() {
        let mut scenario = Scenario::from_kind(kind);
        scenario.timesteps = 3;
        let mut solver = EulerImplicitLinearized::new(scenario.config.clone()).unwrap();
        let metrics = BenchmarkRunner::run(&scenario, &mut solver).unwrap();
        assert_eq!(metrics.scenario, kind.name());
        assert!(metrics.total_wall_time >= 0.0);
        assert!(metrics.final_kinetic_energy.is_finite());
    }
}

#[test]
fn column_sags_under_gravity() {
    let mut scenario = Scenario::tet_column();
    scenario.timesteps = 10;
    scenario.config = StepperConfig {
        dt: 1e-3,
        ..Default::default()
    };
    let mut solver = EulerImplicitLinearized::new(scenario.config.clone()).unwrap();
    let metrics = BenchmarkRunner::run(&scenario, &mut solver).unwrap();
    assert!(metrics.max_displacement > 0.0);
    assert!(metrics.final_kinetic_energy > 0.0);
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn metrics_csv_output() {
    let row = sample_metrics("test").to_csv_row();
    assert!(row.starts_with("test,96,4,100,"));
}

#[test]
fn metrics_csv_multi() {
    let csv = BenchmarkMetrics::to_csv(&[sample_metrics("a"), sample_metrics("b")]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("scenario,"));
    let columns = lines[0].split(',').count();
    assert_eq!(lines[1].split(',').count(), columns);
}

#[test]
fn metrics_json_round_trip() {
    let json = BenchmarkMetrics::to_json(&[sample_metrics("test")]).unwrap();
    let back: Vec<BenchmarkMetrics> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].scenario, "test");
    assert_eq!(back[0].dofs, 96);
    assert!((back[0].max_violation - 3e-7).abs() < 1e-20);
}
