//! Procedural mesh generators for benchmarks and testing.
//!
//! All generators return positively oriented cells.

use kinefem_math::DVec3;

use crate::mesh::TetMesh;

/// The unit right-corner tetrahedron: origin, X, Y, Z.
pub fn single_tetrahedron() -> TetMesh {
    TetMesh {
        positions: vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
        tets: vec![[0, 1, 2, 3]],
    }
}

/// A box `[0, size]` split into `nx × ny × nz` cubes, each cube cut into
/// six tetrahedra sharing its main diagonal (Kuhn subdivision, conforming
/// across neighbouring cubes).
///
/// # Example
/// ```
/// use kinefem_math::DVec3;
/// use kinefem_mesh::generators::box_tetrahedra;
/// let mesh = box_tetrahedra(2, 1, 1, DVec3::new(2.0, 1.0, 1.0));
/// assert_eq!(mesh.vertex_count(), 12);
/// assert_eq!(mesh.tet_count(), 12);
/// ```
pub fn box_tetrahedra(nx: usize, ny: usize, nz: usize, size: DVec3) -> TetMesh {
    let (vx, vy, vz) = (nx + 1, ny + 1, nz + 1);
    let mut mesh = TetMesh::with_capacity(vx * vy * vz, 6 * nx * ny * nz);

    let step = size / DVec3::new(nx.max(1) as f64, ny.max(1) as f64, nz.max(1) as f64);
    for k in 0..vz {
        for j in 0..vy {
            for i in 0..vx {
                mesh.positions
                    .push(DVec3::new(i as f64, j as f64, k as f64) * step);
            }
        }
    }

    let index = |i: usize, j: usize, k: usize| (i + vx * (j + vy * k)) as u32;
    const PERMUTATIONS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for perm in PERMUTATIONS {
                    let mut corner = [i, j, k];
                    let mut tet = [index(i, j, k); 4];
                    for (slot, axis) in perm.iter().enumerate() {
                        corner[*axis] += 1;
                        tet[slot + 1] = index(corner[0], corner[1], corner[2]);
                    }
                    mesh.tets.push(tet);
                }
            }
        }
    }

    mesh.fix_orientation();
    mesh
}

/// A slender column of `segments` cubes stacked along Z.
pub fn column(segments: usize, width: f64, height: f64) -> TetMesh {
    box_tetrahedra(1, 1, segments, DVec3::new(width, width, height))
}
