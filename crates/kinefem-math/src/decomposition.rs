//! Matrix decompositions for corotational elements.
//!
//! Provides the polar decomposition F = R·S used to track the rigid rotation
//! of a deformed tetrahedron. The rotation is extracted through the singular
//! value decomposition of F, obtained from the eigen-decomposition of the
//! symmetric matrix FᵀF, with a sign fix so that R is always a proper rotation
//! (det R = +1) even for inverted elements.

use glam::{DMat3, DVec3};
use kinefem_types::constants::DEGENERATE_STRETCH_THRESHOLD;

/// Maximum number of cyclic Jacobi sweeps. Convergence is quadratic, so a
/// 3×3 matrix settles in well under ten.
const MAX_JACOBI_SWEEPS: usize = 32;

/// Eigen-decomposition of a symmetric 3×3 matrix.
#[derive(Debug, Clone, Copy)]
pub struct SymmetricEigen3 {
    /// Eigenvalues, sorted in descending order.
    pub values: DVec3,
    /// Unit eigenvectors stored as columns, in the order of `values`.
    pub vectors: DMat3,
}

/// Result of a 3×3 polar decomposition: F = R · S
#[derive(Debug, Clone, Copy)]
pub struct PolarDecomposition3 {
    /// Proper rotation part (orthonormal, det = +1).
    pub rotation: DMat3,
    /// Stretch part S = Rᵀ F (symmetric; carries a negative entry when F is inverted).
    pub stretch: DMat3,
    /// Singular values of F, descending.
    pub singular_values: DVec3,
}

#[inline]
fn to_rows(m: &DMat3) -> [[f64; 3]; 3] {
    let mut a = [[0.0; 3]; 3];
    for (j, col) in [m.x_axis, m.y_axis, m.z_axis].iter().enumerate() {
        for i in 0..3 {
            a[i][j] = col[i];
        }
    }
    a
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Only the symmetric part of `m` is meaningful; callers pass FᵀF or similar.
pub fn symmetric_eigen_3x3(m: &DMat3) -> SymmetricEigen3 {
    let mut a = to_rows(m);
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    let scale = a[0][0].abs() + a[1][1].abs() + a[2][2].abs();
    let tiny = f64::EPSILON * f64::EPSILON * scale.max(f64::MIN_POSITIVE);

    for _ in 0..MAX_JACOBI_SWEEPS {
        let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
        if off <= tiny {
            break;
        }

        for (p, q) in [(0usize, 1usize), (0, 2), (1, 2)] {
            let apq = a[p][q];
            if apq.abs() <= f64::MIN_POSITIVE {
                continue;
            }

            let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            // A ← A·P
            for row in a.iter_mut() {
                let akp = row[p];
                let akq = row[q];
                row[p] = c * akp - s * akq;
                row[q] = s * akp + c * akq;
            }
            // A ← Pᵀ·A
            for k in 0..3 {
                let apk = a[p][k];
                let aqk = a[q][k];
                a[p][k] = c * apk - s * aqk;
                a[q][k] = s * apk + c * aqk;
            }
            // V ← V·P
            for row in v.iter_mut() {
                let vkp = row[p];
                let vkq = row[q];
                row[p] = c * vkp - s * vkq;
                row[q] = s * vkp + c * vkq;
            }
        }
    }

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| a[j][j].total_cmp(&a[i][i]));

    let column = |j: usize| DVec3::new(v[0][j], v[1][j], v[2][j]);
    SymmetricEigen3 {
        values: DVec3::new(a[order[0]][order[0]], a[order[1]][order[1]], a[order[2]][order[2]]),
        vectors: DMat3::from_cols(column(order[0]), column(order[1]), column(order[2])),
    }
}

/// Compute the polar decomposition of a 3×3 deformation gradient.
///
/// Uses the SVD-based approach:
/// 1. Eigendecompose C = FᵀF = V Σ² Vᵀ
/// 2. Left singular vectors uᵢ = F vᵢ / σᵢ
/// 3. R = U Vᵀ with both U and V forced right-handed
///
/// Collapsed directions (σ ≈ 0) are completed with orthonormal vectors, and a
/// fully collapsed F returns the identity rotation.
pub fn polar_decomposition_3x3(f: &DMat3) -> PolarDecomposition3 {
    let c = f.transpose() * *f;
    let eig = symmetric_eigen_3x3(&c);

    let sigma = DVec3::new(
        eig.values.x.max(0.0).sqrt(),
        eig.values.y.max(0.0).sqrt(),
        eig.values.z.max(0.0).sqrt(),
    );

    if sigma.x < DEGENERATE_STRETCH_THRESHOLD {
        return PolarDecomposition3 {
            rotation: DMat3::IDENTITY,
            stretch: *f,
            singular_values: sigma,
        };
    }

    let v0 = eig.vectors.x_axis;
    let v1 = eig.vectors.y_axis;
    let mut v2 = eig.vectors.z_axis;
    if v0.cross(v1).dot(v2) < 0.0 {
        v2 = -v2;
    }

    let u0 = (*f * v0) / sigma.x;
    let u1 = if sigma.y > DEGENERATE_STRETCH_THRESHOLD * sigma.x {
        let w = (*f * v1) / sigma.y;
        (w - u0 * u0.dot(w))
            .try_normalize()
            .unwrap_or_else(|| u0.any_orthonormal_vector())
    } else {
        u0.any_orthonormal_vector()
    };
    let u2 = u0.cross(u1);

    let u = DMat3::from_cols(u0, u1, u2);
    let v = DMat3::from_cols(v0, v1, v2);
    let rotation = u * v.transpose();

    PolarDecomposition3 {
        rotation,
        stretch: rotation.transpose() * *f,
        singular_values: sigma,
    }
}

/// Compute the deformation gradient F of a tetrahedron.
///
/// Given the current edge matrix Ds = [x1−x0, x2−x0, x3−x0] and the inverse
/// of the reference edge matrix Dm, returns F = Ds · Dm⁻¹.
pub fn deformation_gradient(current: [DVec3; 4], dm_inv: &DMat3) -> DMat3 {
    let ds = DMat3::from_cols(
        current[1] - current[0],
        current[2] - current[0],
        current[3] - current[0],
    );
    ds * *dm_inv
}
