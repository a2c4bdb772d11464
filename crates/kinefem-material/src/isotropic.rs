//! Isotropic linear elasticity.
//!
//! D = λ·(1⊗1) + 2μ·I on the normal block and μ on the engineering shear
//! diagonal.

use faer::Mat;
use kinefem_types::KinefemResult;

use crate::properties::ElasticProperties;
use crate::traits::ElasticityOperator;

/// Isotropic linear-elastic continuum material.
#[derive(Debug, Clone)]
pub struct ContinuumElastic {
    properties: ElasticProperties,
    elasticity: Mat<f64>,
}

impl ContinuumElastic {
    /// Creates a material from validated properties.
    pub fn from_properties(properties: ElasticProperties) -> KinefemResult<Self> {
        properties.validate()?;
        let lambda = properties.lame_lambda();
        let mu = properties.shear_modulus();

        let elasticity = Mat::from_fn(6, 6, |i, j| match (i, j) {
            (i, j) if i < 3 && j < 3 && i == j => lambda + 2.0 * mu,
            (i, j) if i < 3 && j < 3 => lambda,
            (i, j) if i == j => mu,
            _ => 0.0,
        });

        Ok(Self {
            properties,
            elasticity,
        })
    }

    /// Shorthand for an undamped material.
    pub fn new(youngs_modulus: f64, poisson_ratio: f64, density: f64) -> KinefemResult<Self> {
        Self::from_properties(ElasticProperties {
            name: "isotropic".into(),
            youngs_modulus,
            poisson_ratio,
            density,
            rayleigh_alpha: 0.0,
            rayleigh_beta: 0.0,
        })
    }

    /// Returns a copy with Rayleigh damping coefficients set.
    pub fn with_rayleigh_damping(mut self, alpha: f64, beta: f64) -> KinefemResult<Self> {
        self.properties.rayleigh_alpha = alpha;
        self.properties.rayleigh_beta = beta;
        self.properties.validate()?;
        Ok(self)
    }

    pub fn properties(&self) -> &ElasticProperties {
        &self.properties
    }

    pub fn youngs_modulus(&self) -> f64 {
        self.properties.youngs_modulus
    }

    pub fn poisson_ratio(&self) -> f64 {
        self.properties.poisson_ratio
    }
}

impl ElasticityOperator for ContinuumElastic {
    fn elasticity_matrix(&self) -> &Mat<f64> {
        &self.elasticity
    }

    fn density(&self) -> f64 {
        self.properties.density
    }

    fn rayleigh_alpha(&self) -> f64 {
        self.properties.rayleigh_alpha
    }

    fn rayleigh_beta(&self) -> f64 {
        self.properties.rayleigh_beta
    }

    fn name(&self) -> &str {
        &self.properties.name
    }
}
