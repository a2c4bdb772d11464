//! Elasticity operator trait: the material abstraction seen by elements.
//!
//! Elements never look at Young's modulus or Poisson ratio directly: they ask
//! for the Voigt matrix D and multiply. Any linear constitutive law can be
//! plugged in by implementing this trait.

use faer::Mat;

/// A linear constitutive law for 3D continua.
///
/// # Voigt convention
///
/// Rows/columns are ordered `xx, yy, zz, xy, yz, zx`, with engineering
/// shear strains (γ = 2ε) in the last three slots.
pub trait ElasticityOperator: Send + Sync {
    /// Constant 6×6 elasticity matrix D (σ = D ε).
    fn elasticity_matrix(&self) -> &Mat<f64>;

    /// Mass density ρ [kg/m³].
    fn density(&self) -> f64;

    /// Rayleigh mass-proportional damping coefficient α.
    fn rayleigh_alpha(&self) -> f64 {
        0.0
    }

    /// Rayleigh stiffness-proportional damping coefficient β.
    fn rayleigh_beta(&self) -> f64 {
        0.0
    }

    /// Returns the name of this constitutive model.
    fn name(&self) -> &str;
}
