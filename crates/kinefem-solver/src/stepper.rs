//! Linearized implicit Euler with Baumgarte-stabilized bilateral constraints.
//!
//! One step:
//!
//! ```text
//! update → layout → inject → assemble H, f
//!        → per constraint: bias (β/h·C, prescribed J·v), Jacobian
//!        → KKT solve for λ → f += Cqᵀλ → v = H⁻¹f
//!        → integrate positions → fetch_reactions(1/h)
//! ```
//!
//! The multipliers of this scheme are impulses, so reactions are scaled by
//! `1/h` to report forces.

use std::time::Instant;

use kinefem_math::sparse::CsrMatrix;
use kinefem_math::DQuat;
use kinefem_system::{ConstraintContributor, SystemDescriptor, SystemState};
use kinefem_telemetry::{EventBus, EventKind};
use kinefem_types::{KinefemError, KinefemResult};

use crate::assembly::{assemble_system, AssemblyFactors};
use crate::config::StepperConfig;
use crate::kkt::SchurComplementSolver;
use crate::model::Model;
use crate::strategy::{SolverStrategy, StepResult};

/// Time stepper solving one linear KKT system per step.
pub struct EulerImplicitLinearized {
    config: StepperConfig,
    kkt: SchurComplementSolver,
    bus: Option<EventBus>,
    step_index: u64,
}

impl EulerImplicitLinearized {
    pub fn new(config: StepperConfig) -> KinefemResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            kkt: SchurComplementSolver::new(),
            bus: None,
            step_index: 0,
        })
    }

    /// Attaches an event bus, flushed at the end of every step.
    pub fn with_telemetry(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    pub fn steps_taken(&self) -> u64 {
        self.step_index
    }

    /// Runs `steps` steps of the configured size.
    pub fn run(&mut self, model: &mut Model, steps: usize) -> KinefemResult<Vec<StepResult>> {
        let dt = self.config.dt;
        let mut results = Vec::with_capacity(steps);
        for _ in 0..steps {
            results.push(self.step(model, dt)?);
        }
        if let Some(bus) = self.bus.as_mut() {
            bus.finalize();
        }
        Ok(results)
    }

    fn emit(&mut self, kind: EventKind) {
        if let Some(bus) = self.bus.as_mut() {
            bus.record(kind);
        }
    }

    fn report(&mut self, model: &Model, dt: f64, result: &StepResult) -> KinefemResult<()> {
        if self.bus.is_none() {
            return Ok(());
        }
        for constraint in model.constraints() {
            let max_abs = constraint
                .violation()
                .iter()
                .fold(0.0_f64, |acc, v| acc.max(v.abs()));
            self.emit(EventKind::ConstraintViolation {
                constraint: constraint.name().to_owned(),
                max_abs,
            });
            self.emit(EventKind::Reaction {
                constraint: constraint.name().to_owned(),
                values: constraint
                    .rows()
                    .multipliers()
                    .iter()
                    .map(|l| l / dt)
                    .collect(),
            });
        }
        self.emit(EventKind::Energy {
            kinetic: model.kinetic_energy()?,
            elastic: model.elastic_energy()?,
        });
        self.emit(EventKind::StepEnd {
            wall_time: result.wall_time,
            dofs: result.dofs,
            constraints: result.constraints,
        });
        if let Some(bus) = self.bus.as_mut() {
            let tally = bus.end_step();
            tracing::trace!(step = tally.step, events = tally.events, "telemetry delivered");
        }
        Ok(())
    }
}

/// Registers every active constraint's rows, then loads its bias and
/// Jacobian. `bias_factor` multiplies the position violation.
pub(crate) fn load_constraints(
    state: &SystemState,
    constraints: &mut [Box<dyn ConstraintContributor>],
    descriptor: &mut SystemDescriptor,
    bias_factor: f64,
    recovery_clamp: f64,
    do_clamp: bool,
) -> KinefemResult<()> {
    for constraint in constraints.iter_mut() {
        constraint.inject(descriptor);
    }
    for constraint in constraints.iter_mut() {
        constraint.bi_reset();
        constraint.bi_load_c(bias_factor, recovery_clamp, do_clamp);
        constraint.bi_load_ct(1.0);
        constraint.bi_load_prescribed(state)?;
        constraint.to_descriptor(descriptor)?;
        constraint.load_jacobians(descriptor)?;
    }
    Ok(())
}

/// Largest `|Cq·x + b|`.
pub(crate) fn constraint_residual(cq: &CsrMatrix, x: &[f64], bias: &[f64]) -> f64 {
    if cq.rows == 0 || x.is_empty() {
        return bias.iter().fold(0.0_f64, |acc, b| acc.max(b.abs()));
    }
    cq.mul_vec(x)
        .iter()
        .zip(bias)
        .fold(0.0_f64, |acc, (r, b)| acc.max((r + b).abs()))
}

/// Advances every position by its velocity over `h`. Fixed holders move
/// too, so prescribed speeds carry them along.
fn integrate_positions(state: &mut SystemState, h: f64) {
    for node in &mut state.nodes {
        node.pos += node.vel * h;
    }
    for node in &mut state.field_nodes {
        node.p += node.p_dt * h;
    }
    for shaft in &mut state.shafts {
        shaft.pos += shaft.vel * h;
    }
    for body in &mut state.bodies {
        body.frame.position += body.lin_vel * h;
        body.frame.rotation =
            (DQuat::from_scaled_axis(body.ang_vel * h) * body.frame.rotation).normalize();
    }
}

impl SolverStrategy for EulerImplicitLinearized {
    fn step(&mut self, model: &mut Model, dt: f64) -> KinefemResult<StepResult> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(KinefemError::InvalidConfig(format!(
                "step size must be positive, got {dt}"
            )));
        }
        let start = Instant::now();
        if let Some(bus) = self.bus.as_mut() {
            bus.begin_step(self.step_index);
        }
        self.emit(EventKind::StepBegin {
            sim_time: model.state.time,
            dt,
        });

        model.update_all()?;
        let max_violation = model.max_violation();

        let layout = model.state.build_layout();
        let mut descriptor = SystemDescriptor::new(layout);
        let system = assemble_system(
            model,
            descriptor.layout(),
            AssemblyFactors::dynamic(dt),
            self.config.gravity_vec(),
        )?;

        let (state, constraints) = model.split_constraints();
        load_constraints(
            state,
            constraints,
            &mut descriptor,
            self.config.baumgarte_factor / dt,
            self.config.recovery_clamp,
            self.config.do_clamp,
        )?;

        let cq = descriptor.jacobian_matrix();
        let bias = descriptor.bias().to_vec();
        self.kkt.factorize(&system.matrix)?;
        let multipliers =
            self.kkt
                .solve_multipliers(&cq, &system.rhs, &bias, self.config.constraint_compliance)?;
        descriptor.multipliers_mut().copy_from_slice(&multipliers);

        let mut rhs = system.rhs;
        for constraint in constraints.iter_mut() {
            constraint.from_descriptor(&descriptor)?;
            constraint.load_residual_cql(descriptor.layout(), &mut rhs, descriptor.multipliers(), 1.0)?;
        }
        let velocities = self.kkt.solve_primal(&rhs)?;
        let final_residual = constraint_residual(&cq, &velocities, &bias);

        model
            .state
            .scatter_velocities(descriptor.layout(), &velocities)?;
        integrate_positions(&mut model.state, dt);
        model.state.time += dt;

        let (_, constraints) = model.split_constraints();
        for constraint in constraints.iter_mut() {
            constraint.fetch_reactions(1.0 / dt);
        }

        let result = StepResult {
            iterations: 1,
            final_residual,
            max_violation,
            converged: final_residual.is_finite(),
            wall_time: start.elapsed().as_secs_f64(),
            dofs: descriptor.layout().total_dofs(),
            constraints: descriptor.n_constraints(),
        };
        tracing::debug!(
            step = self.step_index,
            time = model.state.time,
            dofs = result.dofs,
            rows = result.constraints,
            residual = result.final_residual,
            "step complete"
        );
        self.report(model, dt, &result)?;
        self.step_index += 1;
        Ok(result)
    }

    fn name(&self) -> &str {
        "euler_implicit_linearized"
    }
}
