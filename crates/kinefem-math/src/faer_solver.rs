//! Sparse LLᵀ backed by `faer`.
//!
//! Both matrices the stepper factorizes are symmetric positive definite:
//! the mass/stiffness block H and the constraint Schur complement. The
//! factorization is kept until the next [`SparseSolver::factorize`] so one
//! step can back-substitute many right-hand sides against it.

use faer::linalg::solvers::Solve;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use faer::sparse::{SparseColMat, Triplet};
use faer::{Mat, Side};

use crate::sparse::{CsrMatrix, SparseSolver};

/// Cached sparse Cholesky factor.
#[derive(Default)]
pub struct FaerSolver {
    factor: Option<Llt<usize, f64>>,
    dimension: usize,
}

impl FaerSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order of the last factorized matrix, 0 before any factorization.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Solves `A X = B` for `columns` right-hand sides at once.
    ///
    /// `entry(i, j)` yields `B[i][j]`. The result is returned column-major
    /// as a faer matrix of shape `dimension × columns`.
    pub fn solve_columns(
        &self,
        columns: usize,
        entry: impl Fn(usize, usize) -> f64,
    ) -> Result<Mat<f64>, String> {
        let factor = self.factor()?;
        let rhs = Mat::from_fn(self.dimension, columns, entry);
        Ok(factor.solve(&rhs))
    }

    fn factor(&self) -> Result<&Llt<usize, f64>, String> {
        self.factor
            .as_ref()
            .ok_or_else(|| "no factorization available".to_string())
    }
}

/// Compressed-row storage to faer's compressed-column matrix.
fn to_faer(matrix: &CsrMatrix) -> Result<SparseColMat<usize, f64>, String> {
    let triplets: Vec<Triplet<usize, usize, f64>> = (0..matrix.rows)
        .flat_map(|row| {
            (matrix.row_ptr[row]..matrix.row_ptr[row + 1]).map(move |k| Triplet {
                row,
                col: matrix.col_idx[k],
                val: matrix.values[k],
            })
        })
        .collect();
    SparseColMat::try_new_from_triplets(matrix.rows, matrix.cols, &triplets)
        .map_err(|e| format!("invalid sparsity pattern: {e:?}"))
}

impl SparseSolver for FaerSolver {
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), String> {
        if matrix.rows != matrix.cols {
            return Err(format!("{}×{} matrix is not square", matrix.rows, matrix.cols));
        }
        if matrix.rows == 0 {
            return Err("matrix has no rows".into());
        }
        self.factor = None;
        self.dimension = matrix.rows;

        let csc = to_faer(matrix)?;
        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| format!("symbolic analysis: {e:?}"))?;
        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper)
            .map_err(|e| format!("not positive definite: {e:?}"))?;
        self.factor = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> Result<(), String> {
        if rhs.len() != self.dimension || solution.len() != self.dimension {
            return Err(format!(
                "vectors of length {}/{} against order {}",
                rhs.len(),
                solution.len(),
                self.dimension
            ));
        }
        let x = self.solve_columns(1, |i, _| rhs[i])?;
        for (i, out) in solution.iter_mut().enumerate() {
            *out = x[(i, 0)];
        }
        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factor.is_some()
    }
}
