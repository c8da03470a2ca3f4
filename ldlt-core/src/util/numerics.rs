//! Dense vector and matrix helpers used by the QP iteration.
//!
//! Matrices here are nalgebra-owned (column-major); the helpers walk them
//! column by column.

use crate::linalg::Scalar;
use nalgebra::DMatrix;

/// ‖v‖∞, zero for an empty slice.
#[inline]
pub fn inf_norm<T: Scalar>(v: &[T]) -> T {
    v.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
}

#[inline]
pub fn dot<T: Scalar>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

/// out = M x
pub fn mat_vec<T: Scalar>(m: &DMatrix<T>, x: &[T], out: &mut [T]) {
    assert_eq!(m.ncols(), x.len());
    assert_eq!(m.nrows(), out.len());
    out.fill(T::zero());
    for (j, &xj) in x.iter().enumerate() {
        if xj == T::zero() {
            continue;
        }
        for (o, &mij) in out.iter_mut().zip(m.column(j).iter()) {
            *o = *o + mij * xj;
        }
    }
}

/// out = Mᵀ x
pub fn mat_t_vec<T: Scalar>(m: &DMatrix<T>, x: &[T], out: &mut [T]) {
    assert_eq!(m.nrows(), x.len());
    assert_eq!(m.ncols(), out.len());
    for (j, o) in out.iter_mut().enumerate() {
        *o = dot(m.column(j).as_slice(), x);
    }
}

/// True when every entry is finite.
#[inline]
pub fn all_finite<T: Scalar>(v: &[T]) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norms_and_products() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut out = vec![0.0; 2];
        mat_vec(&m, &[1.0, 0.0, -1.0], &mut out);
        assert_eq!(out, vec![-2.0, -2.0]);

        let mut out_t = vec![0.0; 3];
        mat_t_vec(&m, &[1.0, 1.0], &mut out_t);
        assert_eq!(out_t, vec![5.0, 7.0, 9.0]);

        assert_eq!(inf_norm(&[1.0, -3.0, 2.0]), 3.0);
        assert_eq!(inf_norm::<f64>(&[]), 0.0);
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
        assert!(!all_finite(&[1.0, f64::NAN]));
    }
}
