//! CLI command implementations.

use kinefem_bench::metrics::BenchmarkMetrics;
use kinefem_bench::runner::BenchmarkRunner;
use kinefem_bench::scenarios::{Scenario, ScenarioKind};
use kinefem_material::MaterialDatabase;
use kinefem_solver::{EulerImplicitLinearized, StepperConfig};
use kinefem_telemetry::{EventBus, EventKind, VecSink};

fn scenario_kind(name: &str) -> Result<ScenarioKind, Box<dyn std::error::Error>> {
    ScenarioKind::from_name(name).ok_or_else(|| {
        let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
        format!("Unknown scenario: '{name}'. Available: {}", available.join(", ")).into()
    })
}

fn with_material(
    scenario: Scenario,
    material_name: Option<&str>,
) -> Result<Scenario, Box<dyn std::error::Error>> {
    let Some(name) = material_name else {
        return Ok(scenario);
    };
    let db = MaterialDatabase::with_defaults();
    let props = db.get(name).ok_or_else(|| {
        format!(
            "Unknown material: '{name}'. Available: {}",
            db.names().join(", ")
        )
    })?;
    Ok(scenario.with_material(props.clone()))
}

/// Run one scenario, printing the state of its constraints at the end.
pub fn simulate(
    scenario_name: &str,
    config_path: Option<&str>,
    steps: Option<u32>,
    telemetry: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("kinefem Simulation");
    println!("──────────────────");

    let mut scenario = Scenario::from_kind(scenario_kind(scenario_name)?);
    if let Some(path) = config_path {
        scenario.config = StepperConfig::load(path)?;
        println!("Config:     {path}");
    }
    if let Some(n) = steps {
        scenario.timesteps = n;
    }

    let mut model = scenario.build_model()?;
    let mut stepper = EulerImplicitLinearized::new(scenario.config.clone())?;
    let sink = VecSink::new();
    if telemetry {
        let mut bus = EventBus::new();
        bus.add_sink(Box::new(sink.clone()));
        stepper = stepper.with_telemetry(bus);
    }

    println!("Scenario:   {}", scenario.kind.name());
    println!("Steps:      {} × {:.1e}s", scenario.timesteps, scenario.config.dt);
    println!();

    let results = stepper.run(&mut model, scenario.timesteps as usize)?;
    let max_violation = results.iter().fold(0.0_f64, |a, r| a.max(r.max_violation));
    let wall: f64 = results.iter().map(|r| r.wall_time).sum();

    println!("  Sim time:      {:.4}s", model.state.time);
    println!("  Wall time:     {:.3}s", wall);
    println!("  Max violation: {:.3e}", max_violation);
    println!("  Kinetic:       {:.6e}", model.kinetic_energy()?);
    println!("  Elastic:       {:.6e}", model.elastic_energy()?);
    for constraint in model.constraints() {
        let lambdas: Vec<String> = constraint
            .rows()
            .multipliers()
            .iter()
            .map(|l| format!("{:.4e}", l / scenario.config.dt))
            .collect();
        println!("  {:<14} reactions [{}]", constraint.name(), lambdas.join(", "));
    }

    if telemetry {
        let events = sink.events();
        let worst = events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::ConstraintViolation { max_abs, .. } => Some((e.step, *max_abs)),
                _ => None,
            })
            .fold(None, |acc: Option<(u64, f64)>, (step, v)| match acc {
                Some((_, best)) if best >= v => acc,
                _ => Some((step, v)),
            });
        println!();
        println!("  Events:        {}", events.len());
        if let Some((step, v)) = worst {
            println!("  Worst drift:   {:.3e} at step {}", v, step);
        }
    }

    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    output_path: Option<&str>,
    material_name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("kinefem Benchmark Suite");
    println!("═══════════════════════");
    println!();

    let kinds: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_kind(scenario_name)?]
    };

    let mut all_metrics = Vec::new();
    for kind in kinds {
        let scenario = with_material(Scenario::from_kind(kind), material_name)?;
        let mut solver = EulerImplicitLinearized::new(scenario.config.clone())?;

        println!("Running: {} ({} steps)", kind.name(), scenario.timesteps);
        let metrics = BenchmarkRunner::run(&scenario, &mut solver)
            .map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  DOFs / rows:   {} / {}", metrics.dofs, metrics.constraints);
        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
        println!("  Max violation: {:.3e}", metrics.max_violation);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        println!();

        all_metrics.push(metrics);
    }

    match output_path {
        Some(path) if path.ends_with(".json") => {
            std::fs::write(path, BenchmarkMetrics::to_json(&all_metrics)?)?;
            println!("Results written to: {path}");
        }
        Some(path) => {
            std::fs::write(path, BenchmarkMetrics::to_csv(&all_metrics))?;
            println!("Results written to: {path}");
        }
        None => {
            println!("CSV Output:");
            println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
        }
    }

    Ok(())
}

/// List scenarios and material presets.
pub fn list() -> Result<(), Box<dyn std::error::Error>> {
    println!("Scenarios:");
    for kind in ScenarioKind::all() {
        let scenario = Scenario::from_kind(*kind);
        println!("  {:<24} {} steps", kind.name(), scenario.timesteps);
    }
    println!();

    println!("Materials:");
    let db = MaterialDatabase::with_defaults();
    let mut names = db.names();
    names.sort_unstable();
    for name in names {
        if let Some(props) = db.get(name) {
            println!(
                "  {:<12} E = {:.3e} Pa, ν = {:.2}, ρ = {:.0} kg/m³",
                name, props.youngs_modulus, props.poisson_ratio, props.density
            );
        }
    }
    Ok(())
}

/// Validate a stepper config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("kinefem Validator");
    println!("─────────────────");
    println!();

    if path.ends_with(".toml") {
        println!("Validating config: {path}");
        let content = std::fs::read_to_string(path)?;
        let config: StepperConfig = toml::from_str(&content)?;
        match config.validate() {
            Ok(()) => println!("✅ Config is valid (dt = {}).", config.dt),
            Err(e) => println!("❌ Config validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (stepper config).");
    }

    Ok(())
}
