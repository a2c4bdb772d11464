//! # kinefem-material
//!
//! Constitutive operators and material database.
//!
//! ## Design
//!
//! The [`ElasticityOperator`] trait hands elements a constant 6×6 Voigt
//! elasticity matrix plus density and Rayleigh damping coefficients.
//! Materials are immutable once built and shared between elements through
//! `Arc`, so a mesh of ten thousand tetrahedra holds one matrix, not ten
//! thousand.
//!
//! ## Models
//!
//! - [`ContinuumElastic`]: isotropic linear elasticity (E, ν)
//! - [`OrthotropicElastic`]: three orthogonal material axes
//! - [`PoissonMaterial`]: conductivity tensor for scalar-field problems
//!
//! [`MaterialDatabase`] provides named engineering presets.

pub mod database;
pub mod isotropic;
pub mod orthotropic;
pub mod poisson;
pub mod properties;
pub mod traits;

pub use database::MaterialDatabase;
pub use isotropic::ContinuumElastic;
pub use orthotropic::OrthotropicElastic;
pub use poisson::PoissonMaterial;
pub use properties::ElasticProperties;
pub use traits::ElasticityOperator;
