//! Corotational 4-node tetrahedron.
//!
//! Geometric nonlinearity is handled by tracking one rigid rotation R per
//! element. The local stiffness `K = V·Bᵀ D B` is computed once; every step
//! R is extracted from the deformation gradient by polar decomposition and
//! the element behaves as a linear element in the rotated frame:
//!
//! ```text
//! f_int = R · K · (Rᵀ·x − x0)
//! H     = (Kf + Rf·β) · R K Rᵀ  +  (Mf + Rf·α) · M_lumped
//! ```
//!
//! Rigid rotations therefore produce no internal force, while strains stay
//! small-strain/linear.

use std::sync::Arc;

use faer::{Col, Mat, Scale};
use kinefem_math::decomposition::{deformation_gradient, polar_decomposition_3x3};
use kinefem_math::{DMat3, DVec3};
use kinefem_material::ElasticityOperator;
use kinefem_system::{Contributor, DofHolder, ElementContributor, SystemState};
use kinefem_types::{KinefemError, KinefemResult, NodeId};

use crate::loads::VolumeGravityLoader;
use crate::shape::{shape_functions, signed_volume, TetGeometry};
use crate::tensors::{StrainTensor, StressTensor};

/// Generalized load and Jacobian determinant at one parametric point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodalLoad {
    /// `N_i · F` per node, 3 components each.
    pub qi: [f64; 12],
    /// `det J = 6·V` of the configuration the load was evaluated on.
    pub det_j: f64,
}

/// Quantities derived at setup.
#[derive(Debug, Clone)]
struct Prepared {
    geometry: TetGeometry,
    /// 6×12 strain-displacement operator.
    b: Mat<f64>,
    /// 12×12 stiffness in the reference frame.
    k_local: Mat<f64>,
}

/// Corotational linear tetrahedron.
pub struct CorotationalTetra {
    name: String,
    nodes: [NodeId; 4],
    material: Arc<dyn ElasticityOperator>,
    prepared: Option<Prepared>,
    rotation: DMat3,
}

impl CorotationalTetra {
    /// Creates an element over four nodes. Node order defines the
    /// orientation: the reference volume must come out positive.
    pub fn new(nodes: [NodeId; 4], material: Arc<dyn ElasticityOperator>) -> KinefemResult<Self> {
        let d = material.elasticity_matrix();
        if d.nrows() != 6 || d.ncols() != 6 {
            return Err(KinefemError::DimensionMismatch(format!(
                "tetrahedron needs a 6×6 elasticity matrix, '{}' is {}×{}",
                material.name(),
                d.nrows(),
                d.ncols()
            )));
        }
        Ok(Self {
            name: format!("tetra_corot[{},{},{},{}]", nodes[0].0, nodes[1].0, nodes[2].0, nodes[3].0),
            nodes,
            material,
            prepared: None,
            rotation: DMat3::IDENTITY,
        })
    }

    pub fn nodes(&self) -> [NodeId; 4] {
        self.nodes
    }

    pub fn material(&self) -> &Arc<dyn ElasticityOperator> {
        &self.material
    }

    /// Current corotational rotation.
    pub fn rotation(&self) -> DMat3 {
        self.rotation
    }

    fn prepared(&self) -> KinefemResult<&Prepared> {
        self.prepared.as_ref().ok_or_else(|| {
            KinefemError::InvariantViolation(format!("'{}' used before setup_initial", self.name))
        })
    }

    /// Reference geometry, available after setup.
    pub fn geometry(&self) -> KinefemResult<&TetGeometry> {
        Ok(&self.prepared()?.geometry)
    }

    /// Signed reference volume.
    pub fn volume(&self) -> KinefemResult<f64> {
        Ok(self.prepared()?.geometry.volume)
    }

    /// The 6×12 strain-displacement operator.
    pub fn b_matrix(&self) -> KinefemResult<&Mat<f64>> {
        Ok(&self.prepared()?.b)
    }

    /// The 12×12 stiffness in the undeformed frame.
    pub fn stiffness_matrix(&self) -> KinefemResult<&Mat<f64>> {
        Ok(&self.prepared()?.k_local)
    }

    fn current_positions(&self, state: &SystemState) -> KinefemResult<[DVec3; 4]> {
        let mut x = [DVec3::ZERO; 4];
        for (slot, id) in x.iter_mut().zip(self.nodes) {
            *slot = state.node(id)?.pos;
        }
        Ok(x)
    }

    /// Signed volume of the current configuration.
    pub fn compute_volume(&self, state: &SystemState) -> KinefemResult<f64> {
        Ok(signed_volume(&self.current_positions(state)?))
    }

    /// Corotated local displacement `Rᵀ·x − x0`, node by node.
    fn local_displacement(&self, state: &SystemState) -> KinefemResult<Col<f64>> {
        let x0 = &self.prepared()?.geometry.x0;
        let x = self.current_positions(state)?;
        let rt = self.rotation.transpose();
        let local: [DVec3; 4] = std::array::from_fn(|a| rt * x[a] - x0[a]);
        Ok(Col::from_fn(12, |k| local[k / 3][k % 3]))
    }

    /// Constant strain in the undeformed, unrotated frame.
    pub fn strain(&self, state: &SystemState) -> KinefemResult<StrainTensor> {
        let d = self.local_displacement(state)?;
        let eps = &self.prepared()?.b * &d;
        Ok(StrainTensor(std::array::from_fn(|i| eps[i])))
    }

    /// Constant stress in the undeformed, unrotated frame. Apply
    /// [`StressTensor::rotated`] with [`rotation`](Self::rotation) for the
    /// current frame.
    pub fn stress(&self, state: &SystemState) -> KinefemResult<StressTensor> {
        let eps = self.strain(state)?;
        let sigma = self.material.elasticity_matrix() * &Col::from_fn(6, |i| eps.0[i]);
        Ok(StressTensor(std::array::from_fn(|i| sigma[i])))
    }

    /// Generalized load `Qi = Nᵀ·F` at volumetric coordinates (u, v, w) and
    /// the Jacobian determinant of either the reference shape or the given
    /// override positions.
    pub fn compute_nf(
        &self,
        u: f64,
        v: f64,
        w: f64,
        f: DVec3,
        positions: Option<&[DVec3; 4]>,
    ) -> KinefemResult<NodalLoad> {
        let det_j = match positions {
            Some(x) => 6.0 * signed_volume(x),
            None => 6.0 * self.prepared()?.geometry.volume,
        };
        let n = shape_functions(u, v, w);
        let mut qi = [0.0; 12];
        for a in 0..4 {
            qi[3 * a..3 * a + 3].copy_from_slice(&(f * n[a]).to_array());
        }
        Ok(NodalLoad { qi, det_j })
    }
}

/// Assembles B (6×12) from the shape-function gradients.
/// Rows: xx, yy, zz, xy, yz, zx (engineering shears).
fn strain_displacement(grads: &[DVec3; 4]) -> Mat<f64> {
    let mut b = Mat::<f64>::zeros(6, 12);
    for (a, g) in grads.iter().enumerate() {
        let c = 3 * a;
        b[(0, c)] = g.x;
        b[(1, c + 1)] = g.y;
        b[(2, c + 2)] = g.z;
        b[(3, c)] = g.y;
        b[(3, c + 1)] = g.x;
        b[(4, c + 1)] = g.z;
        b[(4, c + 2)] = g.y;
        b[(5, c)] = g.z;
        b[(5, c + 2)] = g.x;
    }
    b
}

/// `V · Bᵀ D B`.
fn local_stiffness(b: &Mat<f64>, d: &Mat<f64>, volume: f64) -> Mat<f64> {
    Scale(volume) * &(b.transpose() * &(d * b))
}

/// 3×3 block (a, b) of a 12×12 matrix.
fn block(m: &Mat<f64>, a: usize, b: usize) -> DMat3 {
    let col = |j: usize| DVec3::new(m[(3 * a, 3 * b + j)], m[(3 * a + 1, 3 * b + j)], m[(3 * a + 2, 3 * b + j)]);
    DMat3::from_cols(col(0), col(1), col(2))
}

impl Contributor for CorotationalTetra {
    fn name(&self) -> &str {
        &self.name
    }

    /// Recomputes the corotational rotation from current positions.
    fn update(&mut self, _time: f64, state: &SystemState) -> KinefemResult<()> {
        let edge_inv = self.prepared()?.geometry.edge_inv;
        let x = self.current_positions(state)?;
        let f = deformation_gradient(x, &edge_inv);
        self.rotation = polar_decomposition_3x3(&f).rotation;
        Ok(())
    }
}

impl ElementContributor for CorotationalTetra {
    fn num_nodes(&self) -> usize {
        4
    }

    fn node_coords(&self) -> usize {
        3
    }

    fn sub_block(&self, n: usize) -> DofHolder {
        DofHolder::Node(self.nodes[n])
    }

    fn setup_initial(&mut self, state: &SystemState) -> KinefemResult<()> {
        let mut x0 = [DVec3::ZERO; 4];
        for (slot, id) in x0.iter_mut().zip(self.nodes) {
            *slot = state.node(id)?.x0;
        }
        let geometry = TetGeometry::new(x0)
            .map_err(|e| KinefemError::DegenerateGeometry(format!("'{}': {e}", self.name)))?;

        let b = strain_displacement(&geometry.grads);
        let k_local = local_stiffness(&b, self.material.elasticity_matrix(), geometry.volume);

        self.prepared = Some(Prepared {
            geometry,
            b,
            k_local,
        });
        self.rotation = DMat3::IDENTITY;
        Ok(())
    }

    fn compute_krm_global(
        &self,
        h: &mut Mat<f64>,
        kfactor: f64,
        rfactor: f64,
        mfactor: f64,
    ) -> KinefemResult<()> {
        if h.nrows() != 12 || h.ncols() != 12 {
            return Err(KinefemError::DimensionMismatch(format!(
                "'{}' writes a 12×12 block, got {}×{}",
                self.name,
                h.nrows(),
                h.ncols()
            )));
        }
        let prepared = self.prepared()?;
        let stiff = kfactor + rfactor * self.material.rayleigh_beta();
        let mass = (mfactor + rfactor * self.material.rayleigh_alpha()) * self.nodal_mass();
        let r = self.rotation;
        let rt = r.transpose();

        for a in 0..4 {
            for b in 0..4 {
                let rotated = r * block(&prepared.k_local, a, b) * rt;
                for j in 0..3 {
                    let col = rotated.col(j);
                    for i in 0..3 {
                        h[(3 * a + i, 3 * b + j)] = stiff * col[i];
                    }
                }
            }
        }
        for k in 0..12 {
            h[(k, k)] += mass;
        }
        Ok(())
    }

    fn compute_internal_forces(&self, state: &SystemState, fi: &mut [f64]) -> KinefemResult<()> {
        if fi.len() != 12 {
            return Err(KinefemError::DimensionMismatch(format!(
                "'{}' writes 12 forces, got a buffer of {}",
                self.name,
                fi.len()
            )));
        }
        let local = &self.prepared()?.k_local * &self.local_displacement(state)?;
        for a in 0..4 {
            let fa = self.rotation * DVec3::new(local[3 * a], local[3 * a + 1], local[3 * a + 2]);
            fi[3 * a..3 * a + 3].copy_from_slice(&fa.to_array());
        }
        Ok(())
    }

    fn state_block(&self, state: &SystemState) -> KinefemResult<Vec<f64>> {
        let d = self.local_displacement(state)?;
        Ok((0..d.nrows()).map(|k| d[k]).collect())
    }

    fn strain_energy(&self, state: &SystemState) -> KinefemResult<f64> {
        let d = self.local_displacement(state)?;
        let kd = &self.prepared()?.k_local * &d;
        Ok(0.5 * (d.transpose() * &kd))
    }

    /// ρ·V/4 (zero before setup).
    fn nodal_mass(&self) -> f64 {
        self.prepared
            .as_ref()
            .map(|p| self.material.density() * p.geometry.volume / 4.0)
            .unwrap_or(0.0)
    }

    fn compute_gravity_forces(
        &self,
        _state: &SystemState,
        gravity: DVec3,
        fg: &mut [f64],
    ) -> KinefemResult<()> {
        let q = VolumeGravityLoader::new(gravity).compute_q(self, None)?;
        if fg.len() != q.len() {
            return Err(KinefemError::DimensionMismatch(format!(
                "'{}' writes 12 gravity loads, got a buffer of {}",
                self.name,
                fg.len()
            )));
        }
        fg.copy_from_slice(&q);
        Ok(())
    }
}
