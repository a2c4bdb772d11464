//! The system descriptor: the solver's working storage for one step.
//!
//! Constraints register their rows here (`inject`), then push Jacobian
//! entries, biases and multiplier guesses. After the solve the multipliers
//! are read back from the same place.

use kinefem_math::sparse::CsrMatrix;

use crate::layout::DofLayout;

/// Start row of a constraint block plus the layout epoch it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOffset {
    pub start: usize,
    pub epoch: u64,
}

/// Per-step constraint storage.
#[derive(Debug, Clone)]
pub struct SystemDescriptor {
    layout: DofLayout,
    n_constraints: usize,
    jacobian: Vec<(usize, usize, f64)>,
    bias: Vec<f64>,
    multipliers: Vec<f64>,
}

impl SystemDescriptor {
    /// Creates an empty descriptor over the given layout.
    pub fn new(layout: DofLayout) -> Self {
        Self {
            layout,
            n_constraints: 0,
            jacobian: Vec::new(),
            bias: Vec::new(),
            multipliers: Vec::new(),
        }
    }

    pub fn layout(&self) -> &DofLayout {
        &self.layout
    }

    pub fn epoch(&self) -> u64 {
        self.layout.epoch()
    }

    /// Number of registered constraint rows.
    pub fn n_constraints(&self) -> usize {
        self.n_constraints
    }

    /// Reserves `count` consecutive rows and returns their offset.
    pub fn register_constraints(&mut self, count: usize) -> RowOffset {
        let start = self.n_constraints;
        self.n_constraints += count;
        self.bias.resize(self.n_constraints, 0.0);
        self.multipliers.resize(self.n_constraints, 0.0);
        RowOffset {
            start,
            epoch: self.layout.epoch(),
        }
    }

    /// Appends one Jacobian entry (global row, global column).
    pub fn push_jacobian(&mut self, row: usize, col: usize, value: f64) {
        self.jacobian.push((row, col, value));
    }

    pub fn jacobian_triplets(&self) -> &[(usize, usize, f64)] {
        &self.jacobian
    }

    /// Assembled constraint Jacobian Cq (rows × free DOFs).
    pub fn jacobian_matrix(&self) -> CsrMatrix {
        CsrMatrix::from_triplets(self.n_constraints, self.layout.total_dofs(), &self.jacobian)
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn bias_mut(&mut self) -> &mut [f64] {
        &mut self.bias
    }

    pub fn multipliers(&self) -> &[f64] {
        &self.multipliers
    }

    pub fn multipliers_mut(&mut self) -> &mut [f64] {
        &mut self.multipliers
    }
}
