//! Physical material properties.
//!
//! These are the measurable engineering constants of an isotropic solid, as
//! found in handbooks and material datasheets.

use kinefem_types::{KinefemError, KinefemResult};
use serde::{Deserialize, Serialize};

/// Physical properties of an isotropic linear-elastic material.
///
/// | Quantity | Field | Unit |
/// |---|---|---|
/// | Young's modulus | `youngs_modulus` | Pa |
/// | Poisson ratio | `poisson_ratio` | – |
/// | Density | `density` | kg/m³ |
/// | Rayleigh mass damping | `rayleigh_alpha` | 1/s |
/// | Rayleigh stiffness damping | `rayleigh_beta` | s |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticProperties {
    /// Human-readable name (e.g., "steel").
    pub name: String,

    /// Young's modulus E.
    pub youngs_modulus: f64,

    /// Poisson ratio ν, strictly inside (−1, 0.5).
    pub poisson_ratio: f64,

    /// Mass density ρ.
    pub density: f64,

    /// Rayleigh damping, mass-proportional part.
    #[serde(default)]
    pub rayleigh_alpha: f64,

    /// Rayleigh damping, stiffness-proportional part.
    #[serde(default)]
    pub rayleigh_beta: f64,
}

impl ElasticProperties {
    /// Checks the physical admissibility of the constants.
    pub fn validate(&self) -> KinefemResult<()> {
        if !(self.youngs_modulus > 0.0) {
            return Err(KinefemError::InvalidMaterial(format!(
                "{}: Young's modulus must be positive, got {}",
                self.name, self.youngs_modulus
            )));
        }
        if !(self.poisson_ratio > -1.0 && self.poisson_ratio < 0.5) {
            return Err(KinefemError::InvalidMaterial(format!(
                "{}: Poisson ratio must lie in (-1, 0.5), got {}",
                self.name, self.poisson_ratio
            )));
        }
        if !(self.density >= 0.0) {
            return Err(KinefemError::InvalidMaterial(format!(
                "{}: density must be non-negative, got {}",
                self.name, self.density
            )));
        }
        if self.rayleigh_alpha < 0.0 || self.rayleigh_beta < 0.0 {
            return Err(KinefemError::InvalidMaterial(format!(
                "{}: Rayleigh coefficients must be non-negative",
                self.name
            )));
        }
        Ok(())
    }

    /// First Lamé parameter λ = Eν / ((1+ν)(1−2ν)).
    pub fn lame_lambda(&self) -> f64 {
        let nu = self.poisson_ratio;
        self.youngs_modulus * nu / ((1.0 + nu) * (1.0 - 2.0 * nu))
    }

    /// Shear modulus G = μ = E / (2(1+ν)).
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poisson_ratio))
    }

    /// Bulk modulus K = E / (3(1−2ν)).
    pub fn bulk_modulus(&self) -> f64 {
        self.youngs_modulus / (3.0 * (1.0 - 2.0 * self.poisson_ratio))
    }

    /// Longitudinal wave speed √((λ+2μ)/ρ); zero for massless materials.
    pub fn p_wave_speed(&self) -> f64 {
        if self.density <= 0.0 {
            return 0.0;
        }
        ((self.lame_lambda() + 2.0 * self.shear_modulus()) / self.density).sqrt()
    }
}
