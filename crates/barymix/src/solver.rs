//! Barycentric-style weight solve.
//!
//! Purpose
//! - Turn a clamped query point into the n-dimensional, non-negative,
//!   unit-sum weight vector expressing how close the point sits to each
//!   anchor.
//!
//! Model
//! - The weights are the affine combination of anchors reproducing the
//!   query point: minimize `|Σ w_i a_i − q|²` subject to `Σ w_i = 1`. Its
//!   KKT system is square with the Gram matrix as coefficient block:
//!
//!   ```text
//!   [ G   1 ] [w]   [m]        G_ij = a_i · a_j,   m_i = q · a_i
//!   [ 1ᵀ  0 ] [λ] = [1]
//!   ```
//!
//!   Gaussian elimination with partial pivoting solves it directly when the
//!   anchors pin the solution down (always for a non-degenerate triangle,
//!   where the result is the exact barycentric coordinate vector); for four
//!   or more anchors the system is rank-deficient and the solve falls back
//!   to the minimum-norm least-squares solution, a least-distortion
//!   extension that still reduces toward one-hot at each anchor.
//! - Post-processing shifts out any negative part (`w − min(w)` when
//!   `min(w) < 0`) and renormalizes by the sum, so the result is
//!   non-negative with unit sum. A vanishing sum (all entries equal after
//!   the shift, or degenerate geometry) yields the uniform `1/n` vector
//!   rather than NaN.
//!
//! Code cross-refs: `linalg::solve_square`, `layout::Layout::gram`.

use nalgebra::{DMatrix, DVector, Vector2};

use crate::linalg::{solve_square, vec_min, vec_sum};

/// Shifted-weight sums at or below this are treated as degenerate.
const EPS_SUM: f64 = 1e-12;

/// Solve for the weight vector of `query` against `anchors`.
///
/// `gram` must be the pairwise dot-product matrix of `anchors` (built by
/// [`crate::layout::Layout`]). The returned vector has one entry per
/// anchor, every entry >= 0, and entries summing to 1 within floating-point
/// tolerance. Never panics and never returns NaN: degenerate inputs produce
/// the uniform distribution.
pub fn solve_weights(
    gram: &DMatrix<f64>,
    anchors: &[Vector2<f64>],
    query: Vector2<f64>,
) -> DVector<f64> {
    let n = anchors.len();
    debug_assert_eq!(gram.nrows(), n);
    debug_assert_eq!(gram.ncols(), n);
    if n == 0 {
        return DVector::zeros(0);
    }
    if n == 1 {
        return DVector::from_element(1, 1.0);
    }

    // Weights are invariant under uniform coordinate scaling; dividing the
    // Gram block by the squared anchor scale keeps it commensurate with the
    // unit constraint row, so pivot tolerances are canvas-size-free.
    let scale2 = anchors
        .iter()
        .map(|a| a.norm_squared())
        .fold(0.0, f64::max)
        .max(1e-300);

    // Bordered system: Gram block plus the unit-sum constraint row/column.
    let mut a = DMatrix::zeros(n + 1, n + 1);
    for i in 0..n {
        for j in 0..n {
            a[(i, j)] = gram[(i, j)] / scale2;
        }
        a[(i, n)] = 1.0;
        a[(n, i)] = 1.0;
    }
    let mut b = DVector::zeros(n + 1);
    for i in 0..n {
        b[i] = query.dot(&anchors[i]) / scale2;
    }
    b[n] = 1.0;

    let solution = solve_square(&a, &b);
    let mut w = DVector::from_fn(n, |i, _| solution[i]);
    if w.iter().any(|v| !v.is_finite()) {
        return uniform(n);
    }

    // Shift out the negative part, then renormalize.
    let shift = vec_min(&w).min(0.0);
    if shift < 0.0 {
        w.add_scalar_mut(-shift);
    }
    let sum = vec_sum(&w);
    if !(sum > EPS_SUM) || !sum.is_finite() {
        return uniform(n);
    }
    w /= sum;
    w
}

/// The uniform `1/n` distribution.
#[inline]
pub fn uniform(n: usize) -> DVector<f64> {
    DVector::from_element(n, 1.0 / (n as f64))
}
