//! # kinefem-system
//!
//! The shared ground between contributors and the solver that drives them.
//!
//! ## Overview
//!
//! - [`holders`]: nodes, scalar field nodes, shafts and rigid bodies
//! - [`state`]: the host-owned tables of holders, addressed by typed handles
//! - [`layout`]: the per-step layout pass mapping holders to global offsets
//! - [`descriptor`]: row registration, Jacobian triplets, bias and multipliers
//! - [`rows`]: generic bookkeeping shared by every bilateral constraint
//! - [`protocol`]: the contributor traits (`Contributor`,
//!   `ElementContributor`, `ConstraintContributor`)
//!
//! ## Step sequence
//!
//! ```text
//! update → build_layout → inject → load_jacobians / bi_load_* → solve
//!        → from_descriptor → load_residual_cql → fetch_reactions
//! ```

pub mod descriptor;
pub mod holders;
pub mod layout;
pub mod protocol;
pub mod rows;
pub mod state;

pub use descriptor::{RowOffset, SystemDescriptor};
pub use holders::{FieldNode, Node, RigidBody, Shaft};
pub use layout::{DofHolder, DofLayout};
pub use protocol::{ConstraintContributor, Contributor, ElementContributor};
pub use rows::{ConstraintRow, ConstraintRows, JacobianBlock};
pub use state::SystemState;
