//! Static equilibrium by Newton iterations.
//!
//! Each iteration solves the tangent system for a position increment `dx`
//! with the constraints linearized around the current configuration:
//!
//! ```text
//! K dx = f_ext − f_int + Cqᵀλ
//! Cq dx + C = 0
//! ```
//!
//! Every free holder needs stiffness for `K` to be definite; shafts and
//! rigid bodies only carry inertia, so models that include them as free
//! holders belong to the time stepper.

use std::time::Instant;

use kinefem_math::{DQuat, DVec3};
use kinefem_system::{DofHolder, DofLayout, SystemDescriptor, SystemState};
use kinefem_telemetry::{EventBus, EventKind};
use kinefem_types::KinefemResult;

use crate::assembly::{assemble_system, AssemblyFactors};
use crate::config::StepperConfig;
use crate::kkt::SchurComplementSolver;
use crate::model::Model;
use crate::stepper::{constraint_residual, load_constraints};
use crate::strategy::{SolverStrategy, StepResult};

/// Newton solver for `f_int(x) = f_ext` under bilateral constraints.
pub struct StaticSolver {
    config: StepperConfig,
    kkt: SchurComplementSolver,
    bus: Option<EventBus>,
    solves: u64,
}

impl StaticSolver {
    pub fn new(config: StepperConfig) -> KinefemResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            kkt: SchurComplementSolver::new(),
            bus: None,
            solves: 0,
        })
    }

    pub fn with_telemetry(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Iterates until the largest increment drops below `newton_tolerance`
    /// or the iteration cap is reached. Reactions are fetched unscaled:
    /// the multipliers are forces.
    pub fn solve(&mut self, model: &mut Model) -> KinefemResult<StepResult> {
        let start = Instant::now();
        let gravity = self.config.gravity_vec();
        let mut iterations = 0;
        let mut increment = f64::INFINITY;
        let mut final_residual = 0.0;
        let mut max_violation = 0.0;
        let mut dofs = 0;
        let mut rows = 0;

        while iterations < self.config.max_newton_iterations {
            model.update_all()?;
            if iterations == 0 {
                max_violation = model.max_violation();
            }

            let layout = model.state.build_layout();
            let mut descriptor = SystemDescriptor::new(layout);
            let system =
                assemble_system(model, descriptor.layout(), AssemblyFactors::equilibrium(), gravity)?;

            let (state, constraints) = model.split_constraints();
            load_constraints(
                state,
                constraints,
                &mut descriptor,
                1.0,
                self.config.recovery_clamp,
                false,
            )?;

            let cq = descriptor.jacobian_matrix();
            let bias = descriptor.bias().to_vec();
            let solution = self.kkt.solve(
                &system.matrix,
                &system.rhs,
                &cq,
                &bias,
                self.config.constraint_compliance,
            )?;
            descriptor
                .multipliers_mut()
                .copy_from_slice(&solution.multipliers);
            for constraint in constraints.iter_mut() {
                constraint.from_descriptor(&descriptor)?;
            }

            final_residual = constraint_residual(&cq, &solution.velocities, &bias);
            increment = solution
                .velocities
                .iter()
                .fold(0.0_f64, |acc, d| acc.max(d.abs()));
            apply_displacement(&mut model.state, descriptor.layout(), &solution.velocities)?;

            dofs = descriptor.layout().total_dofs();
            rows = descriptor.n_constraints();
            iterations += 1;
            tracing::debug!(iteration = iterations, increment, "newton iteration");
            if increment < self.config.newton_tolerance {
                break;
            }
        }

        model.update_all()?;
        let (_, constraints) = model.split_constraints();
        for constraint in constraints.iter_mut() {
            constraint.fetch_reactions(1.0);
        }

        let converged = increment < self.config.newton_tolerance;
        if !converged {
            tracing::warn!(iterations, increment, "static solve did not converge");
        }
        let result = StepResult {
            iterations,
            final_residual,
            max_violation,
            converged,
            wall_time: start.elapsed().as_secs_f64(),
            dofs,
            constraints: rows,
        };
        if let Some(bus) = self.bus.as_mut() {
            bus.begin_step(self.solves);
            bus.record(EventKind::Convergence {
                iterations,
                final_residual,
                converged,
            });
            bus.end_step();
        }
        self.solves += 1;
        Ok(result)
    }
}

/// Adds the increment `dx` to the positions of every free holder.
fn apply_displacement(state: &mut SystemState, layout: &DofLayout, dx: &[f64]) -> KinefemResult<()> {
    for (holder, offset) in layout.free_holders() {
        match holder {
            DofHolder::Node(id) => {
                let node = state.node_mut(id)?;
                for k in 0..3 {
                    node.pos[k] += dx[offset + k];
                }
            }
            DofHolder::FieldNode(id) => state.field_node_mut(id)?.p += dx[offset],
            DofHolder::Shaft(id) => state.shaft_mut(id)?.pos += dx[offset],
            DofHolder::Body(id) => {
                let body = state.body_mut(id)?;
                for k in 0..3 {
                    body.frame.position[k] += dx[offset + k];
                }
                let rotation = DVec3::new(dx[offset + 3], dx[offset + 4], dx[offset + 5]);
                body.frame.rotation =
                    (DQuat::from_scaled_axis(rotation) * body.frame.rotation).normalize();
            }
        }
    }
    Ok(())
}

impl SolverStrategy for StaticSolver {
    fn step(&mut self, model: &mut Model, _dt: f64) -> KinefemResult<StepResult> {
        self.solve(model)
    }

    fn name(&self) -> &str {
        "static_newton"
    }
}
