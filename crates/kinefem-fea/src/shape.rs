//! Shape functions and reference geometry of the linear tetrahedron.
//!
//! Volumetric coordinates (r, s, t) map to a point as
//! `x = x0 + r·(x1−x0) + s·(x2−x0) + t·(x3−x0)`; the shape functions are
//! `N = [u, r, s, t]` with `u = 1 − r − s − t`.

use kinefem_math::{DMat3, DVec3};
use kinefem_types::constants::DEGENERATE_VOLUME_THRESHOLD;
use kinefem_types::{KinefemError, KinefemResult};

/// 4-point Gauss rule on the reference tetrahedron (degree 2).
/// Entries are `((r, s, t), weight)`; weights sum to 1.
pub const TET_QUADRATURE_4: [([f64; 3], f64); 4] = {
    const A: f64 = 0.585_410_196_624_968_5;
    const B: f64 = 0.138_196_601_125_010_5;
    [
        ([B, B, B], 0.25),
        ([A, B, B], 0.25),
        ([B, A, B], 0.25),
        ([B, B, A], 0.25),
    ]
};

/// Shape function values at volumetric coordinates (r, s, t).
#[inline]
pub fn shape_functions(r: f64, s: f64, t: f64) -> [f64; 4] {
    [1.0 - r - s - t, r, s, t]
}

/// Edge matrix `[x1−x0, x2−x0, x3−x0]`.
#[inline]
pub fn edge_matrix(x: &[DVec3; 4]) -> DMat3 {
    DMat3::from_cols(x[1] - x[0], x[2] - x[0], x[3] - x[0])
}

/// Signed volume `det(E)/6`; positive when node 3 lies on the side of the
/// (0,1,2) face pointed to by the right-hand rule.
#[inline]
pub fn signed_volume(x: &[DVec3; 4]) -> f64 {
    edge_matrix(x).determinant() / 6.0
}

/// Invariant reference geometry of a tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetGeometry {
    /// Reference node positions.
    pub x0: [DVec3; 4],
    /// Signed reference volume (> 0).
    pub volume: f64,
    /// Inverse of the reference edge matrix.
    pub edge_inv: DMat3,
    /// Constant gradients ∇N_i.
    pub grads: [DVec3; 4],
}

impl TetGeometry {
    /// Derives the geometry, rejecting inverted, flat and ill-conditioned
    /// tetrahedra.
    pub fn new(x0: [DVec3; 4]) -> KinefemResult<Self> {
        let e = edge_matrix(&x0);
        let volume = e.determinant() / 6.0;
        if !(volume > DEGENERATE_VOLUME_THRESHOLD) {
            return Err(KinefemError::DegenerateGeometry(format!(
                "signed volume {volume:e} is not positive"
            )));
        }

        let edge_inv = e.inverse();
        if !edge_inv.is_finite() {
            return Err(KinefemError::DegenerateGeometry(
                "edge matrix is not invertible".into(),
            ));
        }

        let g1 = edge_inv.row(0);
        let g2 = edge_inv.row(1);
        let g3 = edge_inv.row(2);
        Ok(Self {
            x0,
            volume,
            edge_inv,
            grads: [-(g1 + g2 + g3), g1, g2, g3],
        })
    }

    /// Volumetric coordinates of a point.
    pub fn local_coordinates(&self, p: DVec3) -> DVec3 {
        self.edge_inv * (p - self.x0[0])
    }

    /// Centroid of the reference shape.
    pub fn centroid(&self) -> DVec3 {
        (self.x0[0] + self.x0[1] + self.x0[2] + self.x0[3]) * 0.25
    }
}
