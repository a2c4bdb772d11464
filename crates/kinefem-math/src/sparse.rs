//! Sparse matrix representation and solver interface.
//!
//! Provides a CSR (Compressed Sparse Row) matrix and a trait
//! for sparse symmetric positive-definite solvers.

use serde::{Deserialize, Serialize};

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores a sparse matrix in row-major order. This is the standard
/// format for sparse linear algebra libraries (faer, SuiteSparse).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row pointer array (length = rows + 1).
    /// `row_ptr[i]..row_ptr[i+1]` are the indices into `col_idx` and `values`
    /// for non-zeros in row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices of non-zero entries.
    pub col_idx: Vec<usize>,
    /// Non-zero values.
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// Creates an empty CSR matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns the number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Creates a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries are summed and each row is sorted by column.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut per_row: Vec<Vec<(usize, f64)>> = vec![Vec::new(); rows];
        for &(r, c, v) in triplets {
            per_row[r].push((c, v));
        }

        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());
        row_ptr.push(0);

        for entries in per_row.iter_mut() {
            entries.sort_unstable_by_key(|&(c, _)| c);
            let mut last: Option<usize> = None;
            for &(c, v) in entries.iter() {
                if last == Some(c) {
                    if let Some(tail) = values.last_mut() {
                        *tail += v;
                    }
                } else {
                    col_idx.push(c);
                    values.push(v);
                    last = Some(c);
                }
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Returns the entry at (row, col), zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[range.clone()]
            .binary_search(&col)
            .map(|k| self.values[range.start + k])
            .unwrap_or(0.0)
    }

    /// Computes `A · x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; self.rows];
        for (row, out) in y.iter_mut().enumerate() {
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                *out += self.values[idx] * x[self.col_idx[idx]];
            }
        }
        y
    }

    /// Computes `Aᵀ · x`.
    pub fn transpose_mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; self.cols];
        for (row, &xr) in x.iter().enumerate().take(self.rows) {
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                y[self.col_idx[idx]] += self.values[idx] * xr;
            }
        }
        y
    }

    /// Copies row `row` into a dense vector of length `cols`.
    pub fn dense_row(&self, row: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.cols];
        for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
            out[self.col_idx[idx]] = self.values[idx];
        }
        out
    }
}

/// Trait for sparse symmetric positive-definite solvers.
pub trait SparseSolver {
    /// Factorize the matrix. Call once per matrix.
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), String>;

    /// Solve Ax = b using the pre-computed factorization.
    /// Returns x in the provided output buffer.
    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> Result<(), String>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;
}
