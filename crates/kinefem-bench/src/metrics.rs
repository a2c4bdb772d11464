//! Benchmark metrics: data collected during a benchmark run.

use kinefem_types::{KinefemError, KinefemResult};
use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub scenario: String,
    /// Free DOFs of the last layout.
    pub dofs: usize,
    /// Constraint rows of the last layout.
    pub constraints: usize,
    pub timesteps: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per timestep (seconds).
    pub avg_step_time: f64,
    pub min_step_time: f64,
    pub max_step_time: f64,
    pub final_kinetic_energy: f64,
    pub final_elastic_energy: f64,
    /// Largest constraint violation seen at the start of any step.
    pub max_violation: f64,
    /// Largest node or body displacement from the initial position.
    pub max_displacement: f64,
    pub avg_iterations: f64,
}

impl BenchmarkMetrics {
    pub fn to_csv_header() -> String {
        "scenario,dofs,constraints,timesteps,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,final_ke,final_elastic,max_violation,max_displacement,avg_iterations".to_string()
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6e},{:.3e},{:.6},{:.1}",
            self.scenario,
            self.dofs,
            self.constraints,
            self.timesteps,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.final_kinetic_energy,
            self.final_elastic_energy,
            self.max_violation,
            self.max_displacement,
            self.avg_iterations,
        )
    }

    /// Header plus one row per run.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    pub fn to_json(metrics: &[BenchmarkMetrics]) -> KinefemResult<String> {
        serde_json::to_string_pretty(metrics).map_err(|e| KinefemError::Serialization(e.to_string()))
    }
}
