//! Dense LDL^T factorization kernel.
//!
//! Computes L and D such that A = L D L^T, where:
//! - L is lower triangular with unit diagonal
//! - D is diagonal
//!
//! No pivoting and no square roots. Only the lower triangle (i >= j) of A is
//! read. The factor is written to the lower triangle of the destination L;
//! its strictly upper part is never read by anything in this module.
//!
//! The kernel does not regularize: callers that need a safety margin add it
//! to A before factorizing. A zero or negative pivot is not detected and
//! simply propagates into L and D (possibly as non-finite values).

use super::scalar::Scalar;
use super::strategy::FactorizationStrategy;
use super::view::{Layout, LdltView, LdltViewMut, MatrixView, MatrixViewMut, VectorViewMut};

/// Factorizes `src` into `dst` (out of place).
///
/// Reads the lower triangle of `src`. Panics if the dimensions of `src` and
/// `dst` disagree.
pub fn factorize<T: Scalar>(
    dst: LdltViewMut<'_, T>,
    src: MatrixView<'_, T>,
    strategy: FactorizationStrategy,
) {
    let n = dst.dim();
    assert!(
        src.nrows() == n && src.ncols() == n,
        "cannot factorize a {}x{} matrix into an LDLT destination of dimension {}",
        src.nrows(),
        src.ncols(),
        n,
    );

    let (mut l, d) = dst.into_parts();
    match strategy.working_layout(l.layout()) {
        None => {
            l.copy_lower_from(src);
            factor_lower_in_place(l, d);
        }
        Some(layout) => {
            let mut work = vec![T::zero(); n * n];
            let mut w = MatrixViewMut::from_slice(&mut work, n, n, layout);
            w.copy_lower_from(src);
            factor_lower_in_place(w.rb_mut(), d);
            l.copy_lower_from(w.rb());
        }
    }
}

/// Factorizes in place: the lower triangle of `ldl.l` holds A on entry and
/// the unit lower factor on exit.
pub fn factorize_in_place<T: Scalar>(ldl: LdltViewMut<'_, T>, strategy: FactorizationStrategy) {
    let n = ldl.dim();
    let (mut l, d) = ldl.into_parts();
    match strategy.working_layout(l.layout()) {
        None => factor_lower_in_place(l, d),
        Some(layout) => {
            let mut work = vec![T::zero(); n * n];
            let mut w = MatrixViewMut::from_slice(&mut work, n, n, layout);
            w.copy_lower_from(l.rb());
            factor_lower_in_place(w.rb_mut(), d);
            l.copy_lower_from(w.rb());
        }
    }
}

#[inline]
fn factor_lower_in_place<T: Scalar>(l: MatrixViewMut<'_, T>, d: VectorViewMut<'_, T>) {
    match l.layout() {
        Layout::ColMajor => factor_by_columns(l, d),
        Layout::RowMajor => factor_by_rows(l, d),
    }
}

/// Right-looking elimination. Every inner loop walks down a column.
///
/// ```text
/// d[k]      = A[k,k]
/// L[k+1:,k] = A[k+1:,k] / d[k]
/// A[j:,j]  -= L[j:,k] * (d[k] * L[j,k])      for j > k
/// ```
fn factor_by_columns<T: Scalar>(mut l: MatrixViewMut<'_, T>, mut d: VectorViewMut<'_, T>) {
    let n = d.len();
    for k in 0..n {
        let dk = l.get(k, k);
        d.write(k, dk);
        l.write(k, k, T::one());

        for i in k + 1..n {
            let lik = l.get(i, k) / dk;
            l.write(i, k, lik);
        }

        for j in k + 1..n {
            let f = l.get(j, k) * dk;
            for i in j..n {
                let updated = l.get(i, j) - l.get(i, k) * f;
                l.write(i, j, updated);
            }
        }
    }
}

/// Up-looking elimination. Every inner loop walks along a row.
///
/// ```text
/// L[i,j] = (A[i,j] - sum_{p<j} L[i,p] L[j,p] d[p]) / d[j]     for j < i
/// d[i]   =  A[i,i] - sum_{p<i} L[i,p]^2 d[p]
/// ```
fn factor_by_rows<T: Scalar>(mut l: MatrixViewMut<'_, T>, mut d: VectorViewMut<'_, T>) {
    let n = d.len();
    for i in 0..n {
        for j in 0..i {
            let mut s = l.get(i, j);
            for p in 0..j {
                s = s - l.get(i, p) * l.get(j, p) * d.get(p);
            }
            l.write(i, j, s / d.get(j));
        }

        let mut di = l.get(i, i);
        for p in 0..i {
            let lip = l.get(i, p);
            di = di - lip * lip * d.get(p);
        }
        d.write(i, di);
        l.write(i, i, T::one());
    }
}

/// Solves `L D L^T x = b` in place (`rhs` holds b on entry, x on exit).
pub fn solve_in_place<T: Scalar>(ldl: LdltView<'_, T>, mut rhs: VectorViewMut<'_, T>) {
    let n = ldl.dim();
    assert_eq!(rhs.len(), n, "right-hand side length does not match the factor");
    let l = ldl.l();
    let d = ldl.d();

    // L z = b
    match l.layout() {
        Layout::ColMajor => {
            for j in 0..n {
                let zj = rhs.get(j);
                for i in j + 1..n {
                    let v = rhs.get(i) - l.get(i, j) * zj;
                    rhs.write(i, v);
                }
            }
        }
        Layout::RowMajor => {
            for i in 0..n {
                let mut s = rhs.get(i);
                for j in 0..i {
                    s = s - l.get(i, j) * rhs.get(j);
                }
                rhs.write(i, s);
            }
        }
    }

    for i in 0..n {
        let v = rhs.get(i) / d.get(i);
        rhs.write(i, v);
    }

    // L^T x = z
    match l.layout() {
        Layout::ColMajor => {
            for i in (0..n).rev() {
                let mut s = rhs.get(i);
                for j in i + 1..n {
                    s = s - l.get(j, i) * rhs.get(j);
                }
                rhs.write(i, s);
            }
        }
        Layout::RowMajor => {
            for j in (0..n).rev() {
                let xj = rhs.get(j);
                for i in 0..j {
                    let v = rhs.get(i) - l.get(j, i) * xj;
                    rhs.write(i, v);
                }
            }
        }
    }
}

/// Writes the full symmetric product `L diag(D) L^T` into `dst`.
///
/// Only the strictly lower part of L is read; its diagonal is taken as one.
pub fn reconstruct<T: Scalar>(mut dst: MatrixViewMut<'_, T>, ldl: LdltView<'_, T>) {
    let n = ldl.dim();
    assert!(
        dst.nrows() == n && dst.ncols() == n,
        "reconstruction target is {}x{}, factor has dimension {}",
        dst.nrows(),
        dst.ncols(),
        n,
    );
    let l = ldl.l();
    let d = ldl.d();
    let unit_lower = |i: usize, p: usize| if i == p { T::one() } else { l.get(i, p) };

    for j in 0..n {
        for i in j..n {
            let mut s = T::zero();
            for p in 0..=j {
                s = s + unit_lower(i, p) * d.get(p) * unit_lower(j, p);
            }
            dst.write(i, j, s);
            dst.write(j, i, s);
        }
    }
}
