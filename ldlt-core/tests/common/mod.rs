//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use ldlt_core::{Layout, QpData};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Well-conditioned SPD matrix `BᵀB + n·I` with B uniform in [-1, 1).
pub fn random_spd(n: usize, seed: u64) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let b = DMatrix::from_fn(n, n, |_, _| rng.gen_range(-1.0..1.0));
    let m = b.transpose() * &b + DMatrix::identity(n, n) * n as f64;
    (&m + m.transpose()) * 0.5
}

/// Copy of `a` whose strictly upper triangle is overwritten with junk.
/// Anything that reads only the lower triangle must not notice.
pub fn with_junk_upper(a: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = a.clone();
    for j in 0..a.ncols() {
        for i in 0..j {
            out[(i, j)] = 1.0e6 + (i * a.ncols() + j) as f64;
        }
    }
    out
}

/// Packs `a` densely in `layout`.
pub fn pack(a: &DMatrix<f64>, layout: Layout) -> Vec<f64> {
    match layout {
        Layout::ColMajor => a.as_slice().to_vec(),
        Layout::RowMajor => a.transpose().as_slice().to_vec(),
    }
}

/// Random feasible equality-constrained QP with `n_eq < n` constraints.
pub fn random_qp(n: usize, n_eq: usize, seed: u64) -> QpData<f64> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(0x9e37));
    let h = random_spd(n, seed) * (1.0 / n as f64);
    let g = DVector::from_fn(n, |_, _| rng.gen_range(-1.0..1.0));
    let a = DMatrix::from_fn(n_eq, n, |_, _| rng.gen_range(-1.0..1.0));
    let x_feas = DVector::from_fn(n, |_, _| rng.gen_range(-1.0..1.0));
    let b = &a * x_feas;
    QpData { h, g, a, b }
}

/// Two copies of the same equality row with different right-hand sides.
pub fn infeasible_qp(n: usize) -> QpData<f64> {
    let mut a = DMatrix::zeros(2, n);
    for j in 0..n {
        a[(0, j)] = 1.0;
        a[(1, j)] = 1.0;
    }
    QpData {
        h: DMatrix::identity(n, n),
        g: DVector::zeros(n),
        a,
        b: DVector::from_vec(vec![1.0, 2.0]),
    }
}
