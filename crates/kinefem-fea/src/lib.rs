//! # kinefem-fea
//!
//! Linear tetrahedral finite elements.
//!
//! - [`CorotationalTetra`]: 4-node solid with per-element rotation tracking:
//!   exact under large rigid rotations, small-strain linear material in the
//!   co-rotating frame
//! - [`PoissonTetra`]: 4-node scalar-field element (heat, potential)
//! - [`VolumeGravityLoader`] / [`VolumeSourceLoader`]: volume loads by
//!   quadrature over the shape functions
//! - [`builder`]: populate a [`SystemState`](kinefem_system::SystemState)
//!   from a tetrahedral mesh
//!
//! Both element kinds share [`TetGeometry`], the invariant reference geometry
//! (signed volume, shape-function gradients) derived once at setup.

pub mod builder;
pub mod loads;
pub mod shape;
pub mod tensors;
pub mod tetra_corot;
pub mod tetra_poisson;

pub use loads::{VolumeGravityLoader, VolumeSourceLoader};
pub use shape::TetGeometry;
pub use tensors::{StrainTensor, StressTensor};
pub use tetra_corot::CorotationalTetra;
pub use tetra_poisson::PoissonTetra;
