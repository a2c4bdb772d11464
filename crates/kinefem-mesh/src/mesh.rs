//! Core tetrahedral mesh type.

use kinefem_math::{DMat3, DVec3};
use kinefem_types::{KinefemError, KinefemResult};
use serde::{Deserialize, Serialize};

/// A tetrahedral mesh: vertex positions and 4-index cells.
///
/// Cell node order defines orientation; a valid cell has a positive signed
/// volume `det[x1−x0, x2−x0, x3−x0] / 6`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TetMesh {
    /// Vertex positions.
    pub positions: Vec<DVec3>,
    /// Tetrahedra as `[v0, v1, v2, v3]`.
    pub tets: Vec<[u32; 4]>,
}

impl TetMesh {
    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, tet_capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_capacity),
            tets: Vec::with_capacity(tet_capacity),
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of tetrahedra.
    #[inline]
    pub fn tet_count(&self) -> usize {
        self.tets.len()
    }

    #[inline]
    pub fn tet(&self, t: usize) -> [u32; 4] {
        self.tets[t]
    }

    /// Corner positions of tetrahedron `t`.
    pub fn tet_positions(&self, t: usize) -> [DVec3; 4] {
        self.tets[t].map(|v| self.positions[v as usize])
    }

    /// Signed volume of tetrahedron `t`.
    pub fn signed_volume(&self, t: usize) -> f64 {
        let x = self.tet_positions(t);
        DMat3::from_cols(x[1] - x[0], x[2] - x[0], x[3] - x[0]).determinant() / 6.0
    }

    /// Sum of signed cell volumes.
    pub fn total_volume(&self) -> f64 {
        (0..self.tet_count()).map(|t| self.signed_volume(t)).sum()
    }

    /// Axis-aligned bounding box `(min, max)`; `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Indices of vertices satisfying `pred`.
    pub fn vertices_where(&self, pred: impl Fn(DVec3) -> bool) -> Vec<u32> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, p)| pred(**p))
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Swaps the last two nodes of every negatively oriented cell.
    pub fn fix_orientation(&mut self) -> usize {
        let mut flipped = 0;
        for t in 0..self.tet_count() {
            if self.signed_volume(t) < 0.0 {
                self.tets[t].swap(2, 3);
                flipped += 1;
            }
        }
        flipped
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - Cell indices are within bounds
    /// - No cell repeats a vertex
    /// - Every cell has a positive signed volume
    pub fn validate(&self) -> KinefemResult<()> {
        let n = self.vertex_count();
        for (t, tet) in self.tets.iter().enumerate() {
            if let Some(&v) = tet.iter().find(|&&v| v as usize >= n) {
                return Err(KinefemError::InvalidMesh(format!(
                    "Tet {t} references vertex {v}, mesh has {n}"
                )));
            }
            for i in 0..4 {
                for j in (i + 1)..4 {
                    if tet[i] == tet[j] {
                        return Err(KinefemError::InvalidMesh(format!(
                            "Tet {t} repeats vertex {}",
                            tet[i]
                        )));
                    }
                }
            }
            let volume = self.signed_volume(t);
            if !(volume > 0.0) {
                return Err(KinefemError::InvalidMesh(format!(
                    "Tet {t} has non-positive volume {volume:e}"
                )));
            }
        }
        Ok(())
    }
}
