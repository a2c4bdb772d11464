//! Material for scalar-field (Poisson-type) problems: heat conduction,
//! electrostatics, potential flow.

use kinefem_math::{DMat3, DVec3};
use kinefem_types::{KinefemError, KinefemResult};
use serde::{Deserialize, Serialize};

/// Conductivity tensor plus the capacity coefficient multiplying ∂P/∂t.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoissonMaterial {
    /// Symmetric conductivity tensor (3×3).
    pub conductivity: DMat3,
    /// Capacity per unit volume (e.g. ρ·c_p for heat).
    pub mass_specific_coeff: f64,
}

impl PoissonMaterial {
    /// Isotropic material with scalar conductivity `k`.
    pub fn isotropic(k: f64, mass_specific_coeff: f64) -> KinefemResult<Self> {
        let material = Self {
            conductivity: DMat3::from_diagonal(DVec3::splat(k)),
            mass_specific_coeff,
        };
        material.validate()?;
        Ok(material)
    }

    pub fn validate(&self) -> KinefemResult<()> {
        let c = self.conductivity;
        let scale = c.to_cols_array().iter().fold(1.0_f64, |a, &b| a.max(b.abs()));
        if !c.abs_diff_eq(c.transpose(), 1e-12 * scale) {
            return Err(KinefemError::InvalidMaterial(
                "conductivity tensor must be symmetric".into(),
            ));
        }
        if c.x_axis.x < 0.0 || c.y_axis.y < 0.0 || c.z_axis.z < 0.0 {
            return Err(KinefemError::InvalidMaterial(
                "conductivity must be non-negative".into(),
            ));
        }
        if self.mass_specific_coeff < 0.0 {
            return Err(KinefemError::InvalidMaterial(
                "mass-specific coefficient must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
