//! Orthotropic linear elasticity.
//!
//! Three mutually orthogonal material axes aligned with the element's
//! reference x, y, z. The normal block is obtained by inverting the
//! compliance block; shears are decoupled.

use faer::Mat;
use kinefem_math::{DMat3, DVec3};
use kinefem_types::{KinefemError, KinefemResult};
use serde::{Deserialize, Serialize};

use crate::traits::ElasticityOperator;

/// Engineering constants of an orthotropic solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthotropicConstants {
    /// Young's moduli along x, y, z.
    pub youngs: [f64; 3],
    /// Poisson ratios ν_xy, ν_xz, ν_yz.
    pub poisson: [f64; 3],
    /// Shear moduli G_xy, G_yz, G_zx.
    pub shear: [f64; 3],
    pub density: f64,
}

/// Orthotropic linear-elastic continuum material.
#[derive(Debug, Clone)]
pub struct OrthotropicElastic {
    constants: OrthotropicConstants,
    elasticity: Mat<f64>,
}

impl OrthotropicElastic {
    /// Builds the stiffness matrix, rejecting constants whose compliance
    /// block is not positive definite.
    pub fn new(constants: OrthotropicConstants) -> KinefemResult<Self> {
        let [ex, ey, ez] = constants.youngs;
        let [nxy, nxz, nyz] = constants.poisson;

        if constants.youngs.iter().chain(constants.shear.iter()).any(|&v| !(v > 0.0)) {
            return Err(KinefemError::InvalidMaterial(
                "orthotropic moduli must be positive".into(),
            ));
        }
        if !(constants.density >= 0.0) {
            return Err(KinefemError::InvalidMaterial(
                "orthotropic density must be non-negative".into(),
            ));
        }

        let compliance = DMat3::from_cols(
            DVec3::new(1.0 / ex, -nxy / ex, -nxz / ex),
            DVec3::new(-nxy / ex, 1.0 / ey, -nyz / ey),
            DVec3::new(-nxz / ex, -nyz / ey, 1.0 / ez),
        );
        let det = compliance.determinant();
        // Leading minors of the compliance block must all be positive.
        let minor2 = 1.0 / (ex * ey) - (nxy / ex) * (nxy / ex);
        if !(det > 0.0) || !(minor2 > 0.0) {
            return Err(KinefemError::InvalidMaterial(
                "orthotropic Poisson ratios give a non-positive compliance".into(),
            ));
        }
        let normal = compliance.inverse();

        let shear = constants.shear;
        let elasticity = Mat::from_fn(6, 6, |i, j| {
            if i < 3 && j < 3 {
                normal.col(j)[i]
            } else if i == j {
                shear[i - 3]
            } else {
                0.0
            }
        });

        Ok(Self {
            constants,
            elasticity,
        })
    }

    pub fn constants(&self) -> &OrthotropicConstants {
        &self.constants
    }
}

impl ElasticityOperator for OrthotropicElastic {
    fn elasticity_matrix(&self) -> &Mat<f64> {
        &self.elasticity
    }

    fn density(&self) -> f64 {
        self.constants.density
    }

    fn name(&self) -> &str {
        "orthotropic"
    }
}
