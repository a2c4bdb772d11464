//! Mesh topology queries.
//!
//! Builds adjacency data from the tetrahedron index buffer: which cells
//! touch each vertex, and which faces lie on the boundary (used for
//! surface loads and for picking fixed nodes).

use std::collections::HashMap;

use crate::mesh::TetMesh;

/// Local face table: each face lists the three local corners, ordered so
/// the normal points out of a positively oriented tetrahedron.
const TET_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

/// Precomputed topology information for a tetrahedral mesh.
#[derive(Debug, Clone)]
pub struct Topology {
    /// For each vertex, the cells that contain it.
    pub vertex_tets: Vec<Vec<u32>>,

    /// Faces that belong to exactly one cell, with outward winding.
    pub boundary_faces: Vec<[u32; 3]>,
}

impl Topology {
    /// Build topology from a tetrahedral mesh.
    pub fn build(mesh: &TetMesh) -> Self {
        let mut vertex_tets = vec![Vec::new(); mesh.vertex_count()];
        let mut faces: HashMap<[u32; 3], (usize, [u32; 3])> = HashMap::new();

        for (t, tet) in mesh.tets.iter().enumerate() {
            for &v in tet {
                vertex_tets[v as usize].push(t as u32);
            }
            for local in TET_FACES {
                let face = local.map(|i| tet[i]);
                let mut key = face;
                key.sort_unstable();
                faces.entry(key).or_insert((0, face)).0 += 1;
            }
        }

        let mut boundary_faces: Vec<[u32; 3]> = faces
            .into_values()
            .filter(|(count, _)| *count == 1)
            .map(|(_, face)| face)
            .collect();
        boundary_faces.sort_unstable();

        Self {
            vertex_tets,
            boundary_faces,
        }
    }

    /// Vertices lying on the boundary, sorted.
    pub fn boundary_vertices(&self) -> Vec<u32> {
        let mut verts: Vec<u32> = self.boundary_faces.iter().flatten().copied().collect();
        verts.sort_unstable();
        verts.dedup();
        verts
    }
}
