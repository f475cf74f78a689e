//! Small dense solves for the bounded-size mixing system.
//!
//! Purpose
//! - Provide exactly the numerics the weight solve needs and nothing more:
//!   Gaussian elimination with partial pivoting for square systems, a
//!   column-pivoted QR minimum-norm fallback for (near-)singular ones, and
//!   the elementwise min/sum helpers used by weight post-processing.
//! - Systems here are tiny (side = anchor count + 1, anchor count <= ~12),
//!   so O(n^3) elimination per pointer move is well inside a 60 Hz budget.
//!
//! Why this design
//! - The mixing system has one fixed shape; a general-purpose decomposition
//!   stack would be dead weight. `nalgebra` supplies storage and vector
//!   arithmetic only.
//! - The fallback is the textbook complete orthogonal decomposition
//!   (column-pivoted Householder QR, then a second QR of the leading rows)
//!   so rank-deficient systems get the minimum-norm least-squares solution
//!   deterministically, independent of pivot luck.
//!
//! Code cross-refs: `solver::solve_weights`, `layout::Layout::gram`.

use nalgebra::{DMatrix, DVector};

/// Relative pivot threshold below which a square system is treated as
/// singular and handed to the QR fallback.
const EPS_PIVOT: f64 = 1e-10;
/// Relative threshold on QR diagonal entries for rank detection.
const EPS_RANK: f64 = 1e-10;

/// Solve the square system `a · x = b`.
///
/// Gaussian elimination with partial pivoting; if the largest available
/// pivot falls below `EPS_PIVOT` relative to the matrix scale, the matrix is
/// rank-deficient and the solve is restarted as a minimum-norm least-squares
/// problem via [`lstsq_min_norm`].
pub fn solve_square(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);
    if n == 0 {
        return DVector::zeros(0);
    }
    let scale = a.amax().max(1.0);
    let mut m = a.clone();
    let mut rhs = b.clone();

    for k in 0..n {
        // Partial pivot: largest |m[i][k]| for i >= k.
        let mut imax = k;
        let mut pmax = m[(k, k)].abs();
        for i in (k + 1)..n {
            let v = m[(i, k)].abs();
            if v > pmax {
                imax = i;
                pmax = v;
            }
        }
        if pmax <= EPS_PIVOT * scale {
            return lstsq_min_norm(a, b);
        }
        if imax != k {
            m.swap_rows(k, imax);
            rhs.swap_rows(k, imax);
        }
        let pivot = m[(k, k)];
        for i in (k + 1)..n {
            let factor = m[(i, k)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                m[(i, j)] -= factor * m[(k, j)];
            }
            rhs[i] -= factor * rhs[k];
        }
    }
    // Back substitution.
    let mut x = DVector::zeros(n);
    for k in (0..n).rev() {
        let mut acc = rhs[k];
        for j in (k + 1)..n {
            acc -= m[(k, j)] * x[j];
        }
        x[k] = acc / m[(k, k)];
    }
    x
}

/// Minimum-norm least-squares solution of `a · x = b` for a possibly
/// rank-deficient `a` (m×n, m and n both small).
///
/// Column-pivoted Householder QR gives `A P = Q R` and a numerical rank r;
/// a second QR of the leading r rows of `R` (transposed) completes the
/// orthogonal decomposition, so the returned solution is the unique one of
/// minimum Euclidean norm. Rank zero yields the zero vector.
pub fn lstsq_min_norm(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    let (m, n) = a.shape();
    debug_assert_eq!(b.len(), m);
    let mut r = a.clone();
    let mut qtb = b.clone();
    let mut perm: Vec<usize> = (0..n).collect();

    let kmax = m.min(n);
    let mut rank = 0;
    for k in 0..kmax {
        // Column pivot: remaining column with the largest trailing norm.
        let mut jmax = k;
        let mut nmax = trailing_norm2(&r, k, k);
        for j in (k + 1)..n {
            let nj = trailing_norm2(&r, k, j);
            if nj > nmax {
                jmax = j;
                nmax = nj;
            }
        }
        if jmax != k {
            r.swap_columns(k, jmax);
            perm.swap(k, jmax);
        }
        if !apply_householder_left(&mut r, &mut qtb, k) {
            break;
        }
        rank = k + 1;
    }
    // Rank: diagonal decay relative to the leading pivot.
    let r00 = r[(0, 0)].abs();
    if r00 == 0.0 || !r00.is_finite() {
        return DVector::zeros(n);
    }
    let mut eff_rank = 0;
    for k in 0..rank {
        if r[(k, k)].abs() > EPS_RANK * r00 {
            eff_rank = k + 1;
        } else {
            break;
        }
    }
    if eff_rank == 0 {
        return DVector::zeros(n);
    }

    // Second factorization: R1^T = Q2 T with R1 the leading eff_rank rows.
    // Minimum-norm solution of R1 z = c is z = Q2 T^{-T} c.
    let mut rt = DMatrix::zeros(n, eff_rank);
    for i in 0..eff_rank {
        for j in 0..n {
            rt[(j, i)] = r[(i, j)];
        }
    }
    let mut reflectors: Vec<DVector<f64>> = Vec::with_capacity(eff_rank);
    for k in 0..eff_rank {
        reflectors.push(householder_column(&mut rt, k));
    }
    // Forward-substitute T^T y = c (T upper triangular => T^T lower).
    let mut y = DVector::zeros(eff_rank);
    for i in 0..eff_rank {
        let mut acc = qtb[i];
        for j in 0..i {
            acc -= rt[(j, i)] * y[j];
        }
        let d = rt[(i, i)];
        if d.abs() == 0.0 {
            return DVector::zeros(n);
        }
        y[i] = acc / d;
    }
    // z = Q2 y: pad and apply the stored reflectors in reverse.
    let mut z = DVector::zeros(n);
    for i in 0..eff_rank {
        z[i] = y[i];
    }
    for k in (0..eff_rank).rev() {
        apply_reflector(&mut z, &reflectors[k], k);
    }
    // Undo the column permutation.
    let mut x = DVector::zeros(n);
    for j in 0..n {
        x[perm[j]] = z[j];
    }
    x
}

/// Smallest entry of `x` (0.0 for an empty vector).
#[inline]
pub fn vec_min(x: &DVector<f64>) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Sum of the entries of `x`.
#[inline]
pub fn vec_sum(x: &DVector<f64>) -> f64 {
    x.iter().sum()
}

fn trailing_norm2(r: &DMatrix<f64>, row0: usize, j: usize) -> f64 {
    let mut s = 0.0;
    for i in row0..r.nrows() {
        s += r[(i, j)] * r[(i, j)];
    }
    s
}

/// Householder step on column `k` of `r`, updating `rhs` in lockstep.
/// Returns false when the column is already (numerically) zero.
fn apply_householder_left(r: &mut DMatrix<f64>, rhs: &mut DVector<f64>, k: usize) -> bool {
    let m = r.nrows();
    let n = r.ncols();
    let norm = trailing_norm2(r, k, k).sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    let alpha = if r[(k, k)] >= 0.0 { -norm } else { norm };
    let mut v = DVector::zeros(m);
    v[k] = r[(k, k)] - alpha;
    for i in (k + 1)..m {
        v[i] = r[(i, k)];
    }
    let vtv = v.dot(&v);
    if vtv == 0.0 {
        return false;
    }
    for j in k..n {
        let mut dot = 0.0;
        for i in k..m {
            dot += v[i] * r[(i, j)];
        }
        let f = 2.0 * dot / vtv;
        for i in k..m {
            r[(i, j)] -= f * v[i];
        }
    }
    let mut dot = 0.0;
    for i in k..m {
        dot += v[i] * rhs[i];
    }
    let f = 2.0 * dot / vtv;
    for i in k..m {
        rhs[i] -= f * v[i];
    }
    r[(k, k)] = alpha;
    for i in (k + 1)..m {
        r[(i, k)] = 0.0;
    }
    true
}

/// Householder step on column `k` of `a` alone; returns the reflector so the
/// implicit Q can be re-applied later.
fn householder_column(a: &mut DMatrix<f64>, k: usize) -> DVector<f64> {
    let m = a.nrows();
    let n = a.ncols();
    let norm = trailing_norm2(a, k, k).sqrt();
    let mut v = DVector::zeros(m);
    if norm == 0.0 || !norm.is_finite() {
        return v;
    }
    let alpha = if a[(k, k)] >= 0.0 { -norm } else { norm };
    v[k] = a[(k, k)] - alpha;
    for i in (k + 1)..m {
        v[i] = a[(i, k)];
    }
    let vtv = v.dot(&v);
    if vtv == 0.0 {
        return DVector::zeros(m);
    }
    for j in k..n {
        let mut dot = 0.0;
        for i in k..m {
            dot += v[i] * a[(i, j)];
        }
        let f = 2.0 * dot / vtv;
        for i in k..m {
            a[(i, j)] -= f * v[i];
        }
    }
    a[(k, k)] = alpha;
    for i in (k + 1)..m {
        a[(i, k)] = 0.0;
    }
    v
}

#[inline]
fn apply_reflector(x: &mut DVector<f64>, v: &DVector<f64>, k: usize) {
    let m = x.len();
    let mut vtv = 0.0;
    for i in k..m {
        vtv += v[i] * v[i];
    }
    if vtv == 0.0 {
        return;
    }
    let mut dot = 0.0;
    for i in k..m {
        dot += v[i] * x[i];
    }
    let f = 2.0 * dot / vtv;
    for i in k..m {
        x[i] -= f * v[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn gaussian_elimination_solves_well_conditioned() {
        let a = dmatrix![2.0, 1.0, -1.0;
                         -3.0, -1.0, 2.0;
                         -2.0, 1.0, 2.0];
        let b = dvector![8.0, -11.0, -3.0];
        let x = solve_square(&a, &b);
        // Known solution (2, 3, -1).
        assert!((x[0] - 2.0).abs() < 1e-10);
        assert!((x[1] - 3.0).abs() < 1e-10);
        assert!((x[2] + 1.0).abs() < 1e-10);
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        let a = dmatrix![0.0, 1.0; 1.0, 0.0];
        let b = dvector![3.0, 5.0];
        let x = solve_square(&a, &b);
        assert!((x[0] - 5.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn singular_system_falls_back_to_min_norm() {
        // Rank-1 consistent system: x + y = 2 (twice).
        let a = dmatrix![1.0, 1.0; 1.0, 1.0];
        let b = dvector![2.0, 2.0];
        let x = solve_square(&a, &b);
        // Minimum-norm solution is (1, 1).
        assert!((x[0] - 1.0).abs() < 1e-9, "x = {x}");
        assert!((x[1] - 1.0).abs() < 1e-9, "x = {x}");
    }

    #[test]
    fn min_norm_picks_shortest_solution_of_underdetermined_rows() {
        // 1x3: x + 2y + 2z = 9; min-norm solution is (1, 2, 2).
        let a = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 2.0]);
        let b = dvector![9.0];
        let x = lstsq_min_norm(&a, &b);
        assert!((x[0] - 1.0).abs() < 1e-9, "x = {x}");
        assert!((x[1] - 2.0).abs() < 1e-9, "x = {x}");
        assert!((x[2] - 2.0).abs() < 1e-9, "x = {x}");
    }

    #[test]
    fn min_norm_residual_is_orthogonal_projection() {
        // Inconsistent overdetermined system: least-squares fit of a constant.
        let a = DMatrix::from_row_slice(3, 1, &[1.0, 1.0, 1.0]);
        let b = dvector![1.0, 2.0, 6.0];
        let x = lstsq_min_norm(&a, &b);
        assert!((x[0] - 3.0).abs() < 1e-9, "x = {x}");
    }

    #[test]
    fn zero_matrix_yields_zero_solution() {
        let a = DMatrix::zeros(3, 3);
        let b = dvector![1.0, 2.0, 3.0];
        let x = solve_square(&a, &b);
        assert!(x.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn elementwise_helpers() {
        let x = dvector![3.0, -1.0, 2.0];
        assert_eq!(vec_min(&x), -1.0);
        assert_eq!(vec_sum(&x), 4.0);
    }
}
