//! Solver strategy trait: the seam between a host loop and an integrator.

use kinefem_types::KinefemResult;

use crate::model::Model;

/// Result of a solver step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Linear solves performed (1 for a time step, Newton iterations for a
    /// static solve).
    pub iterations: u32,
    /// Largest `|Cq·v + b|` after the last solve.
    pub final_residual: f64,
    /// Largest position-level violation seen at the start of the step.
    pub max_violation: f64,
    pub converged: bool,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
    /// Free DOFs of the layout used.
    pub dofs: usize,
    /// Constraint rows registered.
    pub constraints: usize,
}

/// Anything that advances a [`Model`].
///
/// ```text
/// let mut solver = EulerImplicitLinearized::new(config)?;
/// loop {
///     solver.step(&mut model, dt)?;
/// }
/// ```
pub trait SolverStrategy: Send {
    /// Advances the model by `dt`. Static solvers ignore `dt`.
    fn step(&mut self, model: &mut Model, dt: f64) -> KinefemResult<StepResult>;

    fn name(&self) -> &str;
}
