//! # kinefem-math
//!
//! Linear algebra primitives for the kinefem kernel.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec3`, `DMat3`, `DQuat`)
//! - Rigid coordinate frames (point/direction transforms)
//! - Symmetric 3×3 eigen-decomposition and SVD-based polar decomposition
//! - Sparse matrix representation (CSR) and the `faer` Cholesky solver

pub mod decomposition;
pub mod faer_solver;
pub mod frame;
pub mod sparse;

// Re-export glam types as the canonical math types for kinefem.
pub use glam::{DMat3, DQuat, DVec3};

pub use frame::Frame;
