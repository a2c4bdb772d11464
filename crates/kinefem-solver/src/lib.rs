//! # kinefem-solver
//!
//! Reference collaborators that drive the contribution protocol end to end.
//!
//! ## Key Types
//!
//! - [`Model`]: state tables plus boxed element and constraint contributors
//! - [`assembly`]: global `H = Kf·K + Rf·R + Mf·M` and right-hand side
//! - [`SchurComplementSolver`]: KKT solve through the constraint Schur
//!   complement, both factorizations by sparse Cholesky
//! - [`EulerImplicitLinearized`]: one linear solve per step, Baumgarte
//!   stabilized constraints
//! - [`StaticSolver`]: Newton iterations towards static equilibrium
//! - [`StepperConfig`]: step size, gravity, stabilization and tolerances

pub mod assembly;
pub mod config;
pub mod kkt;
pub mod model;
pub mod statics;
pub mod stepper;
pub mod strategy;

pub use config::StepperConfig;
pub use kkt::{KktSolution, SchurComplementSolver};
pub use model::{ConstraintHandle, ElementHandle, Model};
pub use statics::StaticSolver;
pub use stepper::EulerImplicitLinearized;
pub use strategy::{SolverStrategy, StepResult};
