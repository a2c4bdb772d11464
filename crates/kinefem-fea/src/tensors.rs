//! Constant per-element strain and stress tensors in Voigt form.
//!
//! Order: `xx, yy, zz, xy, yz, zx`. Strain shears are engineering
//! (γ = 2ε); stress shears are tensor components.

use kinefem_math::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Small-strain tensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainTensor(pub [f64; 6]);

/// Cauchy stress tensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressTensor(pub [f64; 6]);

impl StrainTensor {
    pub fn xx(&self) -> f64 {
        self.0[0]
    }
    pub fn yy(&self) -> f64 {
        self.0[1]
    }
    pub fn zz(&self) -> f64 {
        self.0[2]
    }
    /// Engineering shear γ_xy.
    pub fn xy(&self) -> f64 {
        self.0[3]
    }
    pub fn yz(&self) -> f64 {
        self.0[4]
    }
    pub fn zx(&self) -> f64 {
        self.0[5]
    }

    /// Volumetric strain (trace).
    pub fn volumetric(&self) -> f64 {
        self.0[0] + self.0[1] + self.0[2]
    }

    /// Symmetric tensor form (shears halved).
    pub fn to_matrix(&self) -> DMat3 {
        let [xx, yy, zz, xy, yz, zx] = self.0;
        DMat3::from_cols(
            DVec3::new(xx, 0.5 * xy, 0.5 * zx),
            DVec3::new(0.5 * xy, yy, 0.5 * yz),
            DVec3::new(0.5 * zx, 0.5 * yz, zz),
        )
    }
}

impl StressTensor {
    pub fn xx(&self) -> f64 {
        self.0[0]
    }
    pub fn yy(&self) -> f64 {
        self.0[1]
    }
    pub fn zz(&self) -> f64 {
        self.0[2]
    }
    pub fn xy(&self) -> f64 {
        self.0[3]
    }
    pub fn yz(&self) -> f64 {
        self.0[4]
    }
    pub fn zx(&self) -> f64 {
        self.0[5]
    }

    /// Hydrostatic pressure, positive in compression.
    pub fn pressure(&self) -> f64 {
        -(self.0[0] + self.0[1] + self.0[2]) / 3.0
    }

    /// Von Mises equivalent stress.
    pub fn von_mises(&self) -> f64 {
        let [xx, yy, zz, xy, yz, zx] = self.0;
        (0.5 * ((xx - yy).powi(2) + (yy - zz).powi(2) + (zz - xx).powi(2))
            + 3.0 * (xy * xy + yz * yz + zx * zx))
            .sqrt()
    }

    pub fn to_matrix(&self) -> DMat3 {
        let [xx, yy, zz, xy, yz, zx] = self.0;
        DMat3::from_cols(
            DVec3::new(xx, xy, zx),
            DVec3::new(xy, yy, yz),
            DVec3::new(zx, yz, zz),
        )
    }

    /// Rotates the tensor into another frame: R σ Rᵀ.
    pub fn rotated(&self, r: &DMat3) -> StressTensor {
        let m = *r * self.to_matrix() * r.transpose();
        StressTensor([
            m.x_axis.x, m.y_axis.y, m.z_axis.z, m.y_axis.x, m.z_axis.y, m.z_axis.x,
        ])
    }
}
