//! # kinefem-mesh
//!
//! Tetrahedral mesh representation.
//!
//! ## Key Types
//!
//! - [`TetMesh`]: vertex positions plus 4-index tetrahedra.
//! - [`Topology`]: boundary faces and vertex-to-tet adjacency.
//! - Procedural generators for benchmark meshes (single tet, box lattice).

pub mod generators;
pub mod mesh;
pub mod topology;

pub use mesh::TetMesh;
pub use topology::Topology;
