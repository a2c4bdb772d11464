//! The contribution protocol.
//!
//! Every physical object that takes part in the global system implements
//! [`Contributor`] plus one of:
//!
//! - [`ElementContributor`]: adds stiffness, damping, mass and internal
//!   forces over the DOFs of its nodes
//! - [`ConstraintContributor`]: adds bilateral rows: Jacobian, bias and a
//!   Lagrange multiplier per row
//!
//! Constraint implementations supply `rows()`, `rows_mut()`,
//! `fetch_reactions()` and an `update()` that refreshes Jacobians and
//! violations. Registration, bias loading, residual loading, descriptor
//! transfer and multiplier gather/scatter are provided here once for all
//! constraint types.

use std::any::Any;

use faer::Mat;
use kinefem_math::DVec3;
use kinefem_types::{KinefemError, KinefemResult};

use crate::descriptor::SystemDescriptor;
use crate::layout::{DofHolder, DofLayout};
use crate::rows::ConstraintRows;
use crate::state::SystemState;

/// Base capability of everything the stepper drives.
pub trait Contributor: Send {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Recomputes geometry-dependent quantities from the current state.
    fn update(&mut self, time: f64, state: &SystemState) -> KinefemResult<()>;
}

/// A finite element.
///
/// Local matrices and vectors are ordered node by node, each node
/// contributing `sub_block_size(n)` consecutive coordinates.
pub trait ElementContributor: Contributor {
    /// Number of nodes.
    fn num_nodes(&self) -> usize;

    /// Coordinates per node.
    fn node_coords(&self) -> usize;

    /// Size of the local vectors and matrices.
    fn num_coords(&self) -> usize {
        self.num_nodes() * self.node_coords()
    }

    /// Holder backing node `n`.
    fn sub_block(&self, n: usize) -> DofHolder;

    fn sub_block_size(&self, n: usize) -> usize {
        self.sub_block(n).dof_count()
    }

    /// Global offset of node `n`, `None` when the node is fixed.
    fn sub_block_offset(&self, n: usize, layout: &DofLayout) -> KinefemResult<Option<usize>> {
        layout.offset(self.sub_block(n))
    }

    fn is_sub_block_active(&self, n: usize, state: &SystemState) -> KinefemResult<bool> {
        Ok(!state.is_fixed(self.sub_block(n))?)
    }

    /// Computes the invariant reference geometry. Called once before use.
    fn setup_initial(&mut self, state: &SystemState) -> KinefemResult<()>;

    /// Writes `H = Kf·K + Rf·R + Mf·M` into `h` (num_coords × num_coords).
    fn compute_krm_global(
        &self,
        h: &mut Mat<f64>,
        kfactor: f64,
        rfactor: f64,
        mfactor: f64,
    ) -> KinefemResult<()>;

    /// Writes the internal force vector (length num_coords).
    fn compute_internal_forces(&self, state: &SystemState, fi: &mut [f64]) -> KinefemResult<()>;

    /// The element's local state vector.
    fn state_block(&self, state: &SystemState) -> KinefemResult<Vec<f64>>;

    /// Lumped mass (or capacity) attributed to each node.
    fn nodal_mass(&self) -> f64;

    /// Stored energy `½·dᵀK d` of the current state. Zero for elements that
    /// do not track one.
    fn strain_energy(&self, _state: &SystemState) -> KinefemResult<f64> {
        Ok(0.0)
    }

    /// Writes the generalized gravity load (length num_coords). Elements
    /// whose DOFs are not translational leave it zero.
    fn compute_gravity_forces(
        &self,
        _state: &SystemState,
        _gravity: DVec3,
        fg: &mut [f64],
    ) -> KinefemResult<()> {
        fg.fill(0.0);
        Ok(())
    }
}

/// A bilateral constraint expressed as a fixed number of scalar rows.
pub trait ConstraintContributor: Contributor {
    fn rows(&self) -> &ConstraintRows;

    fn rows_mut(&mut self) -> &mut ConstraintRows;

    /// Converts the solved multipliers to physical reactions, scaled by
    /// `factor` (typically 1/h to turn impulses into forces).
    fn fetch_reactions(&mut self, factor: f64);

    /// Concrete access for reading type-specific results such as reaction
    /// torques.
    fn as_any(&self) -> &dyn Any;

    fn is_active(&self) -> bool {
        self.rows().is_active()
    }

    /// Rows this constraint registers (0 when inactive).
    fn num_constraints(&self) -> usize {
        if self.is_active() {
            self.rows().len()
        } else {
            0
        }
    }

    /// Registers the rows with the descriptor. The only place row offsets
    /// are assigned.
    fn inject(&mut self, descriptor: &mut SystemDescriptor) {
        if !self.is_active() {
            self.rows_mut().clear_offset();
            return;
        }
        let offset = descriptor.register_constraints(self.rows().len());
        self.rows_mut().set_offset(offset);
    }

    /// Pushes the cached Jacobian into the descriptor. Blocks of fixed holders
    /// are skipped.
    fn load_jacobians(&self, descriptor: &mut SystemDescriptor) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let start = self.rows().offset(descriptor.epoch())?;
        let mut entries = Vec::new();
        for (i, row) in self.rows().iter().enumerate() {
            for block in &row.blocks {
                if let Some(col) = descriptor.layout().offset(block.holder)? {
                    for (k, &value) in block.as_slice().iter().enumerate() {
                        if value != 0.0 {
                            entries.push((start + i, col + k, value));
                        }
                    }
                }
            }
        }
        for (r, c, v) in entries {
            descriptor.push_jacobian(r, c, v);
        }
        Ok(())
    }

    fn bi_reset(&mut self) {
        for row in self.rows_mut().iter_mut() {
            row.bias = 0.0;
        }
    }

    /// Adds `factor·C` to the bias, bounded to ±`recovery_clamp` when
    /// `do_clamp` is set.
    fn bi_load_c(&mut self, factor: f64, recovery_clamp: f64, do_clamp: bool) {
        let name = self.name().to_owned();
        for row in self.rows_mut().iter_mut() {
            let mut b = factor * row.violation;
            if do_clamp && b.abs() > recovery_clamp {
                tracing::trace!(constraint = %name, bias = b, "bias clamped");
                b = b.clamp(-recovery_clamp, recovery_clamp);
            }
            row.bias += b;
        }
    }

    /// Rheonomic term ∂C/∂t. None of the built-in constraints depend on time.
    fn bi_load_ct(&mut self, _factor: f64) {}

    /// Adds J·v for holders that are fixed but move with a prescribed speed.
    fn bi_load_prescribed(&mut self, state: &SystemState) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let holders = self.rows().holders().to_vec();
        let mut prescribed = Vec::with_capacity(holders.len());
        for holder in &holders {
            prescribed.push(if state.is_fixed(*holder)? {
                Some(state.holder_velocity(*holder)?)
            } else {
                None
            });
        }
        for row in self.rows_mut().iter_mut() {
            for (block, v) in row.blocks.iter().zip(&prescribed) {
                if let Some(v) = v {
                    row.bias += block.dot(v);
                }
            }
        }
        Ok(())
    }

    /// R += c·Jᵀ·λ, with λ read from the global vector `l`.
    fn load_residual_cql(
        &self,
        layout: &DofLayout,
        r: &mut [f64],
        l: &[f64],
        c: f64,
    ) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        check_dofs(self.name(), layout, r.len())?;
        let start = self.rows().span(layout.epoch(), l.len(), "multiplier vector")?;
        for (i, row) in self.rows().iter().enumerate() {
            let lambda = l[start + i];
            for block in &row.blocks {
                if let Some(col) = layout.offset(block.holder)? {
                    for (k, value) in block.as_slice().iter().enumerate() {
                        r[col + k] += c * value * lambda;
                    }
                }
            }
        }
        Ok(())
    }

    /// Qc += c·C, bounded to ±`recovery_clamp` when `do_clamp` is set.
    fn load_constraint_c(
        &self,
        layout: &DofLayout,
        qc: &mut [f64],
        c: f64,
        do_clamp: bool,
        recovery_clamp: f64,
    ) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let start = self.rows().span(layout.epoch(), qc.len(), "constraint vector")?;
        for (i, row) in self.rows().iter().enumerate() {
            let mut value = c * row.violation;
            if do_clamp {
                value = value.clamp(-recovery_clamp, recovery_clamp);
            }
            qc[start + i] += value;
        }
        Ok(())
    }

    /// Copies bias and multiplier guesses into the descriptor.
    fn to_descriptor(&self, descriptor: &mut SystemDescriptor) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let available = descriptor.bias().len().min(descriptor.multipliers().len());
        let start = self.rows().span(descriptor.epoch(), available, "descriptor")?;
        for (i, row) in self.rows().iter().enumerate() {
            descriptor.bias_mut()[start + i] = row.bias;
            descriptor.multipliers_mut()[start + i] = row.multiplier;
        }
        Ok(())
    }

    /// Reads the solved multipliers back from the descriptor.
    fn from_descriptor(&mut self, descriptor: &SystemDescriptor) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let available = descriptor.multipliers().len();
        let start = self.rows().span(descriptor.epoch(), available, "descriptor")?;
        for (i, row) in self.rows_mut().iter_mut().enumerate() {
            row.multiplier = descriptor.multipliers()[start + i];
        }
        Ok(())
    }

    /// Writes the multipliers into the global vector `l`.
    fn gather_reactions(&self, layout: &DofLayout, l: &mut [f64]) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let start = self.rows().span(layout.epoch(), l.len(), "multiplier vector")?;
        for (i, row) in self.rows().iter().enumerate() {
            l[start + i] = row.multiplier;
        }
        Ok(())
    }

    /// Reads the multipliers from the global vector `l`.
    fn scatter_reactions(&mut self, layout: &DofLayout, l: &[f64]) -> KinefemResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let start = self.rows().span(layout.epoch(), l.len(), "multiplier vector")?;
        for (i, row) in self.rows_mut().iter_mut().enumerate() {
            row.multiplier = l[start + i];
        }
        Ok(())
    }

    /// Current position-level violations, one per row.
    fn violation(&self) -> Vec<f64> {
        self.rows().violations()
    }

    /// Jᵀ·λ·factor restricted to the referenced holder `holder_index`.
    fn generalized_reaction(&self, holder_index: usize, factor: f64) -> KinefemResult<[f64; 6]> {
        if holder_index >= self.rows().holders().len() {
            return Err(KinefemError::UnknownHolder(format!(
                "'{}' references {} holders, asked for #{holder_index}",
                self.name(),
                self.rows().holders().len()
            )));
        }
        let mut out = [0.0; 6];
        for row in self.rows().iter() {
            let block = &row.blocks[holder_index];
            for (k, value) in block.as_slice().iter().enumerate() {
                out[k] += value * row.multiplier * factor;
            }
        }
        Ok(out)
    }
}

/// Residual buffers must cover every free DOF of the layout.
fn check_dofs(name: &str, layout: &DofLayout, available: usize) -> KinefemResult<()> {
    if available < layout.total_dofs() {
        return Err(KinefemError::DimensionMismatch(format!(
            "{name}: residual of length {available} for {} DOFs",
            layout.total_dofs()
        )));
    }
    Ok(())
}
