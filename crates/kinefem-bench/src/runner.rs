//! Benchmark runner: executes scenarios with a solver and collects metrics.

use std::time::Instant;

use kinefem_math::DVec3;
use kinefem_solver::{Model, SolverStrategy, StepResult};
use kinefem_types::KinefemResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::Scenario;

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

/// Node and body positions, for displacement tracking.
fn positions(model: &Model) -> Vec<DVec3> {
    model
        .state
        .nodes
        .iter()
        .map(|n| n.pos)
        .chain(model.state.bodies.iter().map(|b| b.frame.position))
        .collect()
}

impl BenchmarkRunner {
    /// Runs one scenario with the given solver, stepping by the scenario's
    /// configured `dt`.
    pub fn run(
        scenario: &Scenario,
        solver: &mut dyn SolverStrategy,
    ) -> KinefemResult<BenchmarkMetrics> {
        let mut model = scenario.build_model()?;
        let initial = positions(&model);

        let mut step_times = Vec::with_capacity(scenario.timesteps as usize);
        let mut total_iterations: u32 = 0;
        let mut max_violation: f64 = 0.0;
        let mut last: Option<StepResult> = None;

        let total_start = Instant::now();
        for _ in 0..scenario.timesteps {
            let result = solver.step(&mut model, scenario.config.dt)?;
            step_times.push(result.wall_time);
            total_iterations += result.iterations;
            max_violation = max_violation.max(result.max_violation);
            last = Some(result);
        }
        let total_wall_time = total_start.elapsed().as_secs_f64();

        let max_displacement = positions(&model)
            .iter()
            .zip(&initial)
            .map(|(now, then)| (*now - *then).length())
            .fold(0.0, f64::max);

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::MAX, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);
        let avg_iterations = if scenario.timesteps > 0 {
            total_iterations as f64 / scenario.timesteps as f64
        } else {
            0.0
        };

        tracing::info!(
            scenario = scenario.kind.name(),
            solver = solver.name(),
            total_wall_time,
            "benchmark finished"
        );

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            dofs: last.as_ref().map_or(0, |r| r.dofs),
            constraints: last.as_ref().map_or(0, |r| r.constraints),
            timesteps: scenario.timesteps,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: min_step,
            max_step_time: max_step,
            final_kinetic_energy: model.kinetic_energy()?,
            final_elastic_energy: model.elastic_energy()?,
            max_violation,
            max_displacement,
            avg_iterations,
        })
    }
}
