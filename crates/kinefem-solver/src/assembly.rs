//! Global system assembly.
//!
//! Builds the matrix and right-hand side of one linear solve over the free
//! DOFs of a layout:
//!
//! ```text
//! H   = Σₑ (Kf·Kₑ + Rf·Rₑ + Mf·Mₑ)  +  Mf·M_holders
//! rhs = Mf·M·v  +  s·(f_ext + f_gravity − f_int)
//! ```
//!
//! With `Kf = h²`, `Rf = h`, `Mf = 1`, `s = h` this is the linearized
//! implicit Euler system in the new velocities. With `Kf = 1` and
//! everything else zero except `s = 1` it is the Newton system of a static
//! solve in the position increments.
//!
//! Element blocks are scattered as triplets; coordinates of fixed holders
//! are dropped.

use faer::Mat;
use kinefem_math::sparse::CsrMatrix;
use kinefem_math::DVec3;
use kinefem_system::{DofHolder, DofLayout, ElementContributor, SystemState};
use kinefem_types::{KinefemError, KinefemResult};

use crate::model::Model;

/// Scale factors of one assembly pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyFactors {
    pub kf: f64,
    pub rf: f64,
    pub mf: f64,
    /// Scale of the force terms on the right-hand side.
    pub load: f64,
}

impl AssemblyFactors {
    /// Linearized implicit Euler with step `h`.
    pub fn dynamic(h: f64) -> Self {
        Self {
            kf: h * h,
            rf: h,
            mf: 1.0,
            load: h,
        }
    }

    /// Tangent stiffness and out-of-balance force.
    pub fn equilibrium() -> Self {
        Self {
            kf: 1.0,
            rf: 0.0,
            mf: 0.0,
            load: 1.0,
        }
    }
}

/// Matrix and right-hand side over the free DOFs.
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    pub matrix: CsrMatrix,
    pub rhs: Vec<f64>,
}

/// Global index of every local coordinate of an element (`None` when fixed),
/// and the matching velocities.
fn element_map(
    element: &dyn ElementContributor,
    state: &SystemState,
    layout: &DofLayout,
) -> KinefemResult<(Vec<Option<usize>>, Vec<f64>)> {
    let nc = element.num_coords();
    let mut map = Vec::with_capacity(nc);
    let mut vel = Vec::with_capacity(nc);
    for n in 0..element.num_nodes() {
        let size = element.sub_block_size(n);
        let offset = element.sub_block_offset(n, layout)?;
        let v = state.holder_velocity(element.sub_block(n))?;
        for k in 0..size {
            map.push(offset.map(|o| o + k));
            vel.push(v[k]);
        }
    }
    if map.len() != nc {
        return Err(KinefemError::DimensionMismatch(format!(
            "'{}' declares {nc} coordinates but its nodes carry {}",
            element.name(),
            map.len()
        )));
    }
    Ok((map, vel))
}

/// Assembles `H` and the right-hand side for `model` over `layout`.
pub fn assemble_system(
    model: &Model,
    layout: &DofLayout,
    factors: AssemblyFactors,
    gravity: DVec3,
) -> KinefemResult<AssembledSystem> {
    let state = &model.state;
    let n = layout.total_dofs();
    let mut triplets: Vec<(usize, usize, f64)> =
        Vec::with_capacity(n + model.element_count() * 144);
    let mut rhs = vec![0.0; n];

    for element in model.elements() {
        let nc = element.num_coords();
        let (map, vel) = element_map(element, state, layout)?;

        let mut h = Mat::<f64>::zeros(nc, nc);
        element.compute_krm_global(&mut h, factors.kf, factors.rf, factors.mf)?;
        for (i, gi) in map.iter().enumerate() {
            let Some(gi) = *gi else { continue };
            for (j, gj) in map.iter().enumerate() {
                let Some(gj) = *gj else { continue };
                let value = h[(i, j)];
                if value != 0.0 {
                    triplets.push((gi, gj, value));
                }
            }
        }

        // Momentum term M·v of the element's own mass.
        if factors.mf != 0.0 {
            let mut m = Mat::<f64>::zeros(nc, nc);
            element.compute_krm_global(&mut m, 0.0, 0.0, factors.mf)?;
            for (i, gi) in map.iter().enumerate() {
                if let Some(gi) = *gi {
                    rhs[gi] += (0..nc).map(|j| m[(i, j)] * vel[j]).sum::<f64>();
                }
            }
        }

        let mut fi = vec![0.0; nc];
        element.compute_internal_forces(state, &mut fi)?;
        let mut fg = vec![0.0; nc];
        element.compute_gravity_forces(state, gravity, &mut fg)?;
        for (i, gi) in map.iter().enumerate() {
            if let Some(gi) = *gi {
                rhs[gi] += factors.load * (fg[i] - fi[i]);
            }
        }
    }

    for (holder, offset) in layout.free_holders() {
        match holder {
            DofHolder::Node(id) => {
                let force = state.node(id)?.force;
                for k in 0..3 {
                    rhs[offset + k] += factors.load * force[k];
                }
            }
            DofHolder::FieldNode(id) => {
                rhs[offset] += factors.load * state.field_node(id)?.source;
            }
            DofHolder::Shaft(id) => {
                let shaft = state.shaft(id)?;
                if factors.mf != 0.0 {
                    triplets.push((offset, offset, factors.mf * shaft.inertia));
                }
                rhs[offset] += factors.mf * shaft.inertia * shaft.vel + factors.load * shaft.torque;
            }
            DofHolder::Body(id) => {
                let body = state.body(id)?;
                let inertia = body.world_inertia();
                if factors.mf != 0.0 {
                    for k in 0..3 {
                        triplets.push((offset + k, offset + k, factors.mf * body.mass));
                    }
                    for c in 0..3 {
                        let col = inertia.col(c);
                        for r in 0..3 {
                            if col[r] != 0.0 {
                                triplets.push((offset + 3 + r, offset + 3 + c, factors.mf * col[r]));
                            }
                        }
                    }
                }
                let momentum = inertia * body.ang_vel;
                let linear = body.lin_vel * (factors.mf * body.mass)
                    + (body.force + gravity * body.mass) * factors.load;
                // Gyroscopic torque −ω × Iω taken explicitly.
                let angular = momentum * factors.mf
                    + (body.torque - body.ang_vel.cross(momentum)) * factors.load;
                for k in 0..3 {
                    rhs[offset + k] += linear[k];
                    rhs[offset + 3 + k] += angular[k];
                }
            }
        }
    }

    tracing::trace!(dofs = n, entries = triplets.len(), "system assembled");
    Ok(AssembledSystem {
        matrix: CsrMatrix::from_triplets(n, n, &triplets),
        rhs,
    })
}
