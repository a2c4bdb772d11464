//! Generic bookkeeping for bilateral constraints.
//!
//! A [`ConstraintRows`] owns the fixed number of scalar equations of one
//! constraint: per-row Jacobian blocks for each referenced holder, the
//! violation, the stabilization bias and the Lagrange multiplier. Concrete
//! constraints fill Jacobians and violations in `update`; everything else in
//! the protocol is implemented once on top of this type.

use kinefem_types::{KinefemError, KinefemResult};

use crate::descriptor::RowOffset;
use crate::layout::DofHolder;

/// Jacobian of one row with respect to the DOFs of one holder.
///
/// Only the first `holder.dof_count()` values are used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobianBlock {
    pub holder: DofHolder,
    pub values: [f64; 6],
}

impl JacobianBlock {
    pub fn new(holder: DofHolder) -> Self {
        Self {
            holder,
            values: [0.0; 6],
        }
    }

    /// The meaningful part of `values`.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.holder.dof_count()]
    }

    /// Dot product with a velocity block of the same holder.
    #[inline]
    pub fn dot(&self, v: &[f64]) -> f64 {
        self.as_slice().iter().zip(v).map(|(a, b)| a * b).sum()
    }
}

/// One scalar bilateral equation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    /// One block per referenced holder, in holder order.
    pub blocks: Vec<JacobianBlock>,
    /// Position-level residual C.
    pub violation: f64,
    /// Velocity-level right-hand side term accumulated by the `bi_load_*` calls.
    pub bias: f64,
    /// Lagrange multiplier from the last solve.
    pub multiplier: f64,
}

/// The rows of one constraint and their registration with a descriptor.
#[derive(Debug, Clone)]
pub struct ConstraintRows {
    name: String,
    holders: Vec<DofHolder>,
    rows: Vec<ConstraintRow>,
    offset: Option<RowOffset>,
    active: bool,
}

impl ConstraintRows {
    /// Creates `count` zeroed rows coupling `holders`. The row count never
    /// changes afterwards.
    pub fn new(name: impl Into<String>, holders: Vec<DofHolder>, count: usize) -> Self {
        let blocks: Vec<JacobianBlock> = holders.iter().copied().map(JacobianBlock::new).collect();
        let rows = (0..count)
            .map(|_| ConstraintRow {
                blocks: blocks.clone(),
                violation: 0.0,
                bias: 0.0,
                multiplier: 0.0,
            })
            .collect();
        Self {
            name: name.into(),
            holders,
            rows,
            offset: None,
            active: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows (fixed at construction).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn holders(&self) -> &[DofHolder] {
        &self.holders
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintRow> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ConstraintRow> {
        self.rows.iter_mut()
    }

    pub fn row(&self, row: usize) -> &ConstraintRow {
        &self.rows[row]
    }

    /// Sets the Jacobian of `row` with respect to holder `holder_index`.
    pub fn set_jacobian(&mut self, row: usize, holder_index: usize, values: &[f64]) {
        let block = &mut self.rows[row].blocks[holder_index];
        let n = block.holder.dof_count().min(values.len());
        block.values = [0.0; 6];
        block.values[..n].copy_from_slice(&values[..n]);
    }

    pub fn jacobian(&self, row: usize, holder_index: usize) -> &[f64] {
        self.rows[row].blocks[holder_index].as_slice()
    }

    pub fn set_violation(&mut self, row: usize, c: f64) {
        self.rows[row].violation = c;
    }

    pub fn violations(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.violation).collect()
    }

    pub fn multipliers(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.multiplier).collect()
    }

    pub fn set_multiplier(&mut self, row: usize, lambda: f64) {
        self.rows[row].multiplier = lambda;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivated rows are not registered with the descriptor and keep
    /// zero multipliers.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.offset = None;
            for row in &mut self.rows {
                row.multiplier = 0.0;
                row.bias = 0.0;
            }
        }
    }

    /// Records the offset assigned by `inject`.
    pub fn set_offset(&mut self, offset: RowOffset) {
        self.offset = Some(offset);
    }

    pub fn clear_offset(&mut self) {
        self.offset = None;
    }

    /// Registered start row, checked against the layout epoch in use.
    pub fn offset(&self, epoch: u64) -> KinefemResult<usize> {
        match self.offset {
            None => Err(KinefemError::Unregistered(self.name.clone())),
            Some(off) if off.epoch != epoch => Err(KinefemError::StaleLayout {
                name: self.name.clone(),
                held: off.epoch,
                current: epoch,
            }),
            Some(off) => Ok(off.start),
        }
    }

    /// Start row after checking that every row fits in a buffer of
    /// `available` entries. `buffer` names the buffer in the error.
    pub fn span(&self, epoch: u64, available: usize, buffer: &str) -> KinefemResult<usize> {
        let start = self.offset(epoch)?;
        let end = start + self.rows.len();
        if end > available {
            return Err(KinefemError::DimensionMismatch(format!(
                "{}: rows {start}..{end} outside {buffer} of length {available}",
                self.name
            )));
        }
        Ok(start)
    }

    pub fn raw_offset(&self) -> Option<RowOffset> {
        self.offset
    }
}
