//! Saddle-point solve through the constraint Schur complement.
//!
//! ```text
//! H v = f + Cqᵀλ
//! Cq v + b + E λ = 0
//! ```
//!
//! H is factorized once by sparse Cholesky and back-substituted against all
//! of Cqᵀ at once to form `S = Cq H⁻¹ Cqᵀ + E`, which is small, dense in
//! practice and factorized the same way. `E = compliance·I` regularizes
//! redundant rows.

use kinefem_math::faer_solver::FaerSolver;
use kinefem_math::sparse::{CsrMatrix, SparseSolver};
use kinefem_types::{KinefemError, KinefemResult};

/// Velocities and multipliers of one KKT solve.
#[derive(Debug, Clone, PartialEq)]
pub struct KktSolution {
    pub velocities: Vec<f64>,
    pub multipliers: Vec<f64>,
}

/// Two cached Cholesky factorizations: H and the Schur complement.
#[derive(Default)]
pub struct SchurComplementSolver {
    primal: FaerSolver,
    dual: FaerSolver,
    dimension: usize,
}

impl SchurComplementSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of primal unknowns of the current factorization.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Factorizes H. An empty H (no free DOFs) is accepted.
    pub fn factorize(&mut self, h: &CsrMatrix) -> KinefemResult<()> {
        self.dimension = h.rows;
        if h.rows == 0 {
            return Ok(());
        }
        self.primal
            .factorize(h)
            .map_err(|e| KinefemError::SolverFailure(format!("system matrix: {e}")))
    }

    /// H⁻¹·rhs.
    pub fn solve_primal(&self, rhs: &[f64]) -> KinefemResult<Vec<f64>> {
        if rhs.len() != self.dimension {
            return Err(KinefemError::DimensionMismatch(format!(
                "right-hand side has {} entries, system has {}",
                rhs.len(),
                self.dimension
            )));
        }
        let mut out = vec![0.0; self.dimension];
        if self.dimension > 0 {
            self.primal
                .solve(rhs, &mut out)
                .map_err(|e| KinefemError::SolverFailure(format!("system matrix: {e}")))?;
        }
        Ok(out)
    }

    /// Solves `(Cq H⁻¹ Cqᵀ + E)·λ = −b − Cq H⁻¹ f` for the multipliers.
    pub fn solve_multipliers(
        &mut self,
        cq: &CsrMatrix,
        f: &[f64],
        b: &[f64],
        compliance: f64,
    ) -> KinefemResult<Vec<f64>> {
        let m = cq.rows;
        if b.len() != m {
            return Err(KinefemError::DimensionMismatch(format!(
                "{m} constraint rows but {} bias entries",
                b.len()
            )));
        }
        if m == 0 || self.dimension == 0 {
            return Ok(vec![0.0; m]);
        }
        if cq.cols != self.dimension {
            return Err(KinefemError::DimensionMismatch(format!(
                "jacobian has {} columns, system has {}",
                cq.cols, self.dimension
            )));
        }

        let h_inv_f = self.solve_primal(f)?;
        let cq_h_inv_f = cq.mul_vec(&h_inv_f);

        // H⁻¹ Cqᵀ in one multi-column back-substitution.
        let cq_rows: Vec<Vec<f64>> = (0..m).map(|j| cq.dense_row(j)).collect();
        let h_inv_cqt = self
            .primal
            .solve_columns(m, |i, j| cq_rows[j][i])
            .map_err(|e| KinefemError::SolverFailure(format!("system matrix: {e}")))?;

        let mut triplets = Vec::with_capacity(m * m);
        for j in 0..m {
            let column: Vec<f64> = (0..self.dimension).map(|i| h_inv_cqt[(i, j)]).collect();
            let s_col = cq.mul_vec(&column);
            for (i, &value) in s_col.iter().enumerate() {
                if i == j {
                    triplets.push((i, j, value + compliance));
                } else if value != 0.0 {
                    triplets.push((i, j, value));
                }
            }
        }
        let schur = CsrMatrix::from_triplets(m, m, &triplets);
        self.dual
            .factorize(&schur)
            .map_err(|e| KinefemError::SolverFailure(format!("Schur complement: {e}")))?;

        let rhs: Vec<f64> = (0..m).map(|i| -b[i] - cq_h_inv_f[i]).collect();
        let mut lambda = vec![0.0; m];
        self.dual
            .solve(&rhs, &mut lambda)
            .map_err(|e| KinefemError::SolverFailure(format!("Schur complement: {e}")))?;
        Ok(lambda)
    }

    /// Full solve: factorize H, find λ, recover `v = H⁻¹(f + Cqᵀλ)`.
    pub fn solve(
        &mut self,
        h: &CsrMatrix,
        f: &[f64],
        cq: &CsrMatrix,
        b: &[f64],
        compliance: f64,
    ) -> KinefemResult<KktSolution> {
        self.factorize(h)?;
        let multipliers = self.solve_multipliers(cq, f, b, compliance)?;
        let mut rhs = f.to_vec();
        if cq.rows > 0 && self.dimension > 0 {
            for (r, extra) in rhs.iter_mut().zip(cq.transpose_mul_vec(&multipliers)) {
                *r += extra;
            }
        }
        let velocities = self.solve_primal(&rhs)?;
        Ok(KktSolution {
            velocities,
            multipliers,
        })
    }
}
