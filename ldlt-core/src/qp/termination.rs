//! Residuals and termination test for the dense QP iteration.
//!
//! Checks for:
//! - Optimality: primal and dual residuals below `eps_abs + eps_rel * scale`
//! - Numerical errors: non-finite iterate or residual

use crate::linalg::Scalar;
use crate::problem::{QpData, QpStatus};
use crate::util::numerics::{all_finite, dot, inf_norm, mat_t_vec, mat_vec};

/// Residual norms at the current iterate.
#[derive(Debug, Clone, Copy)]
pub struct Residuals<T> {
    /// ‖Ax − b‖∞
    pub primal: T,
    /// max(‖Ax‖∞, ‖b‖∞)
    pub primal_scale: T,
    /// ‖Hx + g + Aᵀy‖∞
    pub dual: T,
    /// max(‖Hx‖∞, ‖g‖∞, ‖Aᵀy‖∞)
    pub dual_scale: T,
    /// (1/2) xᵀHx + gᵀx
    pub objective: T,
}

/// Scratch vectors for residual evaluation.
#[derive(Debug, Clone)]
pub struct ResidualScratch<T> {
    pub hx: Vec<T>,
    pub ax: Vec<T>,
    pub aty: Vec<T>,
    pub r_p: Vec<T>,
    pub r_d: Vec<T>,
}

impl<T: Scalar> ResidualScratch<T> {
    pub fn new(n: usize, n_eq: usize) -> Self {
        Self {
            hx: vec![T::zero(); n],
            ax: vec![T::zero(); n_eq],
            aty: vec![T::zero(); n],
            r_p: vec![T::zero(); n_eq],
            r_d: vec![T::zero(); n],
        }
    }
}

pub fn compute_residuals<T: Scalar>(
    model: &QpData<T>,
    x: &[T],
    y: &[T],
    scratch: &mut ResidualScratch<T>,
) -> Residuals<T> {
    let g = model.g.as_slice();
    let b = model.b.as_slice();

    mat_vec(&model.h, x, &mut scratch.hx);
    mat_vec(&model.a, x, &mut scratch.ax);
    mat_t_vec(&model.a, y, &mut scratch.aty);

    for ((r, &ax), &bi) in scratch.r_p.iter_mut().zip(&scratch.ax).zip(b) {
        *r = ax - bi;
    }
    for (((r, &hx), &gi), &aty) in scratch.r_d.iter_mut().zip(&scratch.hx).zip(g).zip(&scratch.aty) {
        *r = hx + gi + aty;
    }

    let half = T::of_f64(0.5);
    let objective = half * dot(x, &scratch.hx) + dot(g, x);

    Residuals {
        primal: inf_norm(&scratch.r_p),
        primal_scale: inf_norm(&scratch.ax).max(inf_norm(b)),
        dual: inf_norm(&scratch.r_d),
        dual_scale: inf_norm(&scratch.hx).max(inf_norm(g)).max(inf_norm(&scratch.aty)),
        objective,
    }
}

/// Returns `Some(status)` if the iteration should stop at this iterate.
pub fn check_termination<T: Scalar>(
    res: &Residuals<T>,
    x: &[T],
    y: &[T],
    eps_abs: T,
    eps_rel: T,
) -> Option<QpStatus> {
    if !res.primal.is_finite() || !res.dual.is_finite() || !all_finite(x) || !all_finite(y) {
        return Some(QpStatus::NumericalError);
    }
    let primal_ok = res.primal <= eps_abs + eps_rel * res.primal_scale;
    let dual_ok = res.dual <= eps_abs + eps_rel * res.dual_scale;
    if primal_ok && dual_ok {
        return Some(QpStatus::Solved);
    }
    None
}
