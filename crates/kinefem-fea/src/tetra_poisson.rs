//! 4-node tetrahedron for scalar-field (Poisson) problems.
//!
//! One DOF per node. `K = V·Bᵀ D B` with B the 3×4 matrix of shape-function
//! gradients and D the conductivity tensor; no rotation tracking.

use std::sync::Arc;

use faer::{Col, Mat, Scale};
use kinefem_math::DVec3;
use kinefem_material::PoissonMaterial;
use kinefem_system::{Contributor, DofHolder, ElementContributor, SystemState};
use kinefem_types::{FieldNodeId, KinefemError, KinefemResult};

use crate::shape::{shape_functions, TetGeometry};

/// Scalar load and Jacobian determinant at one parametric point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarNodalLoad {
    pub qi: [f64; 4],
    pub det_j: f64,
}

/// Linear scalar-field tetrahedron.
pub struct PoissonTetra {
    name: String,
    nodes: [FieldNodeId; 4],
    material: Arc<PoissonMaterial>,
    geometry: Option<TetGeometry>,
    k_local: Mat<f64>,
}

impl PoissonTetra {
    pub fn new(nodes: [FieldNodeId; 4], material: Arc<PoissonMaterial>) -> Self {
        Self {
            name: format!("tetra_poisson[{},{},{},{}]", nodes[0].0, nodes[1].0, nodes[2].0, nodes[3].0),
            nodes,
            material,
            geometry: None,
            k_local: Mat::zeros(4, 4),
        }
    }

    pub fn nodes(&self) -> [FieldNodeId; 4] {
        self.nodes
    }

    pub fn material(&self) -> &PoissonMaterial {
        &self.material
    }

    fn geometry(&self) -> KinefemResult<&TetGeometry> {
        self.geometry.as_ref().ok_or_else(|| {
            KinefemError::InvariantViolation(format!("'{}' used before setup_initial", self.name))
        })
    }

    pub fn volume(&self) -> KinefemResult<f64> {
        Ok(self.geometry()?.volume)
    }

    pub fn stiffness_matrix(&self) -> &Mat<f64> {
        &self.k_local
    }

    fn values(&self, state: &SystemState) -> KinefemResult<[f64; 4]> {
        let mut p = [0.0; 4];
        for (slot, id) in p.iter_mut().zip(self.nodes) {
            *slot = state.field_node(id)?.p;
        }
        Ok(p)
    }

    fn value_col(&self, state: &SystemState) -> KinefemResult<Col<f64>> {
        let p = self.values(state)?;
        Ok(Col::from_fn(4, |a| p[a]))
    }

    /// Constant gradient of the field, B·P.
    pub fn p_gradient(&self, state: &SystemState) -> KinefemResult<DVec3> {
        let grads = self.geometry()?.grads;
        let p = self.values(state)?;
        Ok(grads.iter().zip(p).map(|(g, pa)| *g * pa).sum())
    }

    /// Flux −D·∇P (e.g. heat flux).
    pub fn flux(&self, state: &SystemState) -> KinefemResult<DVec3> {
        Ok(-(self.material.conductivity * self.p_gradient(state)?))
    }

    /// `Qi = Nᵀ·F` for a scalar source F, and `det J = 6·V`.
    pub fn compute_nf(&self, u: f64, v: f64, w: f64, f: f64) -> KinefemResult<ScalarNodalLoad> {
        let det_j = 6.0 * self.geometry()?.volume;
        let n = shape_functions(u, v, w);
        Ok(ScalarNodalLoad {
            qi: n.map(|na| na * f),
            det_j,
        })
    }
}

impl Contributor for PoissonTetra {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, _time: f64, _state: &SystemState) -> KinefemResult<()> {
        self.geometry().map(|_| ())
    }
}

impl ElementContributor for PoissonTetra {
    fn num_nodes(&self) -> usize {
        4
    }

    fn node_coords(&self) -> usize {
        1
    }

    fn sub_block(&self, n: usize) -> DofHolder {
        DofHolder::FieldNode(self.nodes[n])
    }

    fn setup_initial(&mut self, state: &SystemState) -> KinefemResult<()> {
        let mut x0 = [DVec3::ZERO; 4];
        for (slot, id) in x0.iter_mut().zip(self.nodes) {
            *slot = state.field_node(id)?.position;
        }
        let geometry = TetGeometry::new(x0)
            .map_err(|e| KinefemError::DegenerateGeometry(format!("'{}': {e}", self.name)))?;

        let conductivity = self.material.conductivity;
        let d = Mat::from_fn(3, 3, |i, j| conductivity.col(j)[i]);
        let b = Mat::from_fn(3, 4, |i, a| geometry.grads[a][i]);
        self.k_local = Scale(geometry.volume) * &(b.transpose() * &(&d * &b));
        self.geometry = Some(geometry);
        Ok(())
    }

    /// The field equation `C·Ṗ + K·P = Q` is first order, so the capacity
    /// enters through the Rf term; Mf is unused.
    fn compute_krm_global(
        &self,
        h: &mut Mat<f64>,
        kfactor: f64,
        rfactor: f64,
        _mfactor: f64,
    ) -> KinefemResult<()> {
        if h.nrows() != 4 || h.ncols() != 4 {
            return Err(KinefemError::DimensionMismatch(format!(
                "'{}' writes a 4×4 block, got {}×{}",
                self.name,
                h.nrows(),
                h.ncols()
            )));
        }
        self.geometry()?;
        let capacity = rfactor * self.nodal_mass();
        *h = Scale(kfactor) * &self.k_local;
        for a in 0..4 {
            h[(a, a)] += capacity;
        }
        Ok(())
    }

    fn compute_internal_forces(&self, state: &SystemState, fi: &mut [f64]) -> KinefemResult<()> {
        if fi.len() != 4 {
            return Err(KinefemError::DimensionMismatch(format!(
                "'{}' writes 4 values, got a buffer of {}",
                self.name,
                fi.len()
            )));
        }
        self.geometry()?;
        let kp = &self.k_local * &self.value_col(state)?;
        for (a, out) in fi.iter_mut().enumerate() {
            *out = kp[a];
        }
        Ok(())
    }

    fn state_block(&self, state: &SystemState) -> KinefemResult<Vec<f64>> {
        Ok(self.values(state)?.to_vec())
    }

    fn strain_energy(&self, state: &SystemState) -> KinefemResult<f64> {
        self.geometry()?;
        let p = self.value_col(state)?;
        let kp = &self.k_local * &p;
        Ok(0.5 * (p.transpose() * &kp))
    }

    /// Lumped capacity `c·V/4`.
    fn nodal_mass(&self) -> f64 {
        self.geometry
            .as_ref()
            .map(|g| self.material.mass_specific_coeff * g.volume / 4.0)
            .unwrap_or(0.0)
    }
}
