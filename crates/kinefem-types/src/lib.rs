//! # kinefem-types
//!
//! Shared types, handles, error types, and constants
//! for the kinefem multibody/FEA kernel.
//!
//! This crate has zero domain logic: it defines the vocabulary
//! that all other kinefem crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{KinefemError, KinefemResult};
pub use ids::{BodyId, FieldNodeId, NodeId, ShaftId};
