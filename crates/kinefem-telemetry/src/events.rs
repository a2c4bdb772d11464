//! Step event types.
//!
//! Lightweight value types carrying just enough data for monitoring
//! and regression tracking.

use serde::{Deserialize, Serialize};

/// An event tagged with the step that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Step number (0-indexed).
    pub step: u64,
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Step started.
    StepBegin {
        /// Simulation time at the start of the step (seconds).
        sim_time: f64,
        /// Step size (seconds).
        dt: f64,
    },

    /// Step completed.
    StepEnd {
        /// Wall-clock time for the whole step (seconds).
        wall_time: f64,
        /// Free DOFs in this step's layout.
        dofs: usize,
        /// Constraint rows registered this step.
        constraints: usize,
    },

    /// Largest position-level violation of one constraint.
    ConstraintViolation {
        constraint: String,
        max_abs: f64,
    },

    /// Scaled multipliers of one constraint after `fetch_reactions`.
    Reaction {
        constraint: String,
        values: Vec<f64>,
    },

    /// Energy snapshot after the step.
    Energy {
        /// ½ vᵀ M v over nodes, shafts and bodies.
        kinetic: f64,
        /// ½ Σ dᵀ K d over solid elements.
        elastic: f64,
    },

    /// Newton convergence report from a static solve.
    Convergence {
        iterations: u32,
        final_residual: f64,
        converged: bool,
    },

    /// Free-form event.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
