//! Volume loads integrated over the element by quadrature.
//!
//! Both loaders evaluate the element's `compute_nf` at the points of
//! [`TET_QUADRATURE_4`] and accumulate `w · Qi · detJ / 6` (the reference
//! tetrahedron has volume 1/6).

use kinefem_math::DVec3;
use kinefem_types::KinefemResult;

use crate::shape::TET_QUADRATURE_4;
use crate::tetra_corot::CorotationalTetra;
use crate::tetra_poisson::PoissonTetra;

/// Uniform body force `ρ·g` over a corotational tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeGravityLoader {
    pub gravity: DVec3,
}

impl VolumeGravityLoader {
    pub fn new(gravity: DVec3) -> Self {
        Self { gravity }
    }

    /// Generalized nodal loads (12). With `positions` the current shape is
    /// integrated instead of the reference one.
    pub fn compute_q(
        &self,
        element: &CorotationalTetra,
        positions: Option<&[DVec3; 4]>,
    ) -> KinefemResult<[f64; 12]> {
        let force_density = self.gravity * element.material().density();
        let mut q = [0.0; 12];
        for ([r, s, t], weight) in TET_QUADRATURE_4 {
            let nf = element.compute_nf(r, s, t, force_density, positions)?;
            let scale = weight * nf.det_j / 6.0;
            for (qk, qi) in q.iter_mut().zip(nf.qi) {
                *qk += scale * qi;
            }
        }
        Ok(q)
    }
}

/// Uniform volumetric source (heat generation, charge density) over a
/// scalar-field tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSourceLoader {
    pub source: f64,
}

impl VolumeSourceLoader {
    pub fn new(source: f64) -> Self {
        Self { source }
    }

    /// Generalized nodal loads (4).
    pub fn compute_q(&self, element: &PoissonTetra) -> KinefemResult<[f64; 4]> {
        let mut q = [0.0; 4];
        for ([r, s, t], weight) in TET_QUADRATURE_4 {
            let nf = element.compute_nf(r, s, t, self.source)?;
            let scale = weight * nf.det_j / 6.0;
            for (qk, qi) in q.iter_mut().zip(nf.qi) {
                *qk += scale * qi;
            }
        }
        Ok(q)
    }
}
