//! Dense equality-constrained QP instance.
//!
//! Proximal method of multipliers. Every iteration assembles
//!
//! ```text
//! K = H + ρI + (1/μ) AᵀA
//! ```
//!
//! factorizes it with the dense LDLᵀ kernel, and takes
//!
//! ```text
//! x⁺ = K⁻¹ (ρx − g − Aᵀy + (1/μ) Aᵀb)
//! y⁺ = y + (1/μ)(Ax⁺ − b)
//! ```
//!
//! K is positive definite for any PSD H because ρ > 0, so the kernel never
//! sees a zero pivot on well-posed data.

pub mod termination;

use crate::linalg::{DenseLdlt, Layout, MatrixView, MatrixViewMut, Scalar};
use crate::problem::{InitialGuess, ProblemError, QpData, QpResults, QpSettings, QpStatus};
use crate::util::logging::progress_level;
use crate::util::numerics::{dot, mat_t_vec, mat_vec};
use nalgebra::DMatrix;
use std::time::Instant;
use termination::{check_termination, compute_residuals, ResidualScratch};

/// Per-instance scratch, allocated once at construction.
#[derive(Debug, Clone)]
struct QpWorkspace<T: Scalar> {
    /// Packed n×n KKT matrix in `settings.kkt_layout`
    kkt: Vec<T>,
    /// Cached AᵀA (column-major)
    ata: DMatrix<T>,
    /// Cached Aᵀb
    atb: Vec<T>,
    ldl: DenseLdlt<T>,
    rhs: Vec<T>,
    residuals: ResidualScratch<T>,
}

impl<T: Scalar> QpWorkspace<T> {
    fn new(n: usize, n_eq: usize, settings: &QpSettings) -> Self {
        Self {
            kkt: vec![T::zero(); n * n],
            ata: DMatrix::zeros(n, n),
            atb: vec![T::zero(); n],
            ldl: DenseLdlt::new(n, settings.kkt_layout),
            rhs: vec![T::zero(); n],
            residuals: ResidualScratch::new(n, n_eq),
        }
    }
}

/// A dense QP with its own data, workspace, settings and results.
#[derive(Debug, Clone)]
pub struct DenseQp<T: Scalar> {
    /// Solver settings; may be edited between `init` and `solve`.
    pub settings: QpSettings,
    /// Results of the last solve.
    pub results: QpResults<T>,
    model: QpData<T>,
    work: QpWorkspace<T>,
}

impl<T: Scalar> DenseQp<T> {
    /// Creates an instance with `dim` variables and `n_eq` equality
    /// constraints. The model starts as the all-zero problem.
    pub fn new(dim: usize, n_eq: usize) -> Self {
        let settings = QpSettings::default();
        let work = QpWorkspace::new(dim, n_eq, &settings);
        Self {
            settings,
            results: QpResults::new(dim, n_eq),
            model: QpData::zeros(dim, n_eq),
            work,
        }
    }

    /// Number of primal variables.
    #[inline]
    pub fn dim(&self) -> usize {
        self.model.num_vars()
    }

    /// Number of equality constraints.
    #[inline]
    pub fn n_eq(&self) -> usize {
        self.model.num_eq()
    }

    pub fn model(&self) -> &QpData<T> {
        &self.model
    }

    pub fn results(&self) -> &QpResults<T> {
        &self.results
    }

    /// Loads problem data. Resets the results.
    pub fn init(&mut self, data: QpData<T>) -> Result<(), ProblemError> {
        let start = Instant::now();
        let (n, n_eq) = (self.dim(), self.n_eq());
        data.validate(n, n_eq)?;

        let a = &data.a;
        self.work.ata = DMatrix::from_fn(n, n, |i, j| dot(a.column(i).as_slice(), a.column(j).as_slice()));
        mat_t_vec(a, data.b.as_slice(), &mut self.work.atb);
        self.model = data;

        self.results = QpResults::new(n, n_eq);
        self.results.info.setup_time = start.elapsed();
        log::debug!("initialized dense QP: n = {}, n_eq = {}", n, n_eq);
        Ok(())
    }

    /// Stores an explicit starting point and switches the initial-guess
    /// policy to warm start.
    pub fn warm_start(&mut self, x: &[T], y: &[T]) -> Result<(), ProblemError> {
        if x.len() != self.dim() {
            return Err(ProblemError::DimensionMismatch {
                what: "warm start x",
                expected: self.dim(),
                actual: x.len(),
            });
        }
        if y.len() != self.n_eq() {
            return Err(ProblemError::DimensionMismatch {
                what: "warm start y",
                expected: self.n_eq(),
                actual: y.len(),
            });
        }
        self.results.x.copy_from_slice(x);
        self.results.y.copy_from_slice(y);
        self.settings.initial_guess = InitialGuess::WarmStartWithPreviousResult;
        Ok(())
    }

    /// Runs the iteration to convergence or to `max_iter`.
    ///
    /// Never fails: the outcome is recorded in `results.status`.
    pub fn solve(&mut self) {
        let start = Instant::now();
        let Self { settings, results, model, work } = self;
        let n = model.num_vars();
        let level = progress_level(settings.verbose);

        if work.ldl.layout() != settings.kkt_layout || work.ldl.dim() != n {
            work.ldl = DenseLdlt::new(n, settings.kkt_layout);
        }
        if settings.initial_guess == InitialGuess::NoInitialGuess {
            results.x.fill(T::zero());
            results.y.fill(T::zero());
        }

        let rho = T::of_f64(settings.rho);
        let mu_min = T::of_f64(settings.mu_min_eq);
        let mu_factor = T::of_f64(settings.mu_update_factor);
        let mu_threshold = T::of_f64(settings.mu_update_threshold);
        let eps_abs = T::of_f64(settings.eps_abs);
        let eps_rel = T::of_f64(settings.eps_rel);
        let mut mu = T::of_f64(settings.mu_eq).max(mu_min);

        let mut iter = 0;
        let mut mu_updates = 0;
        let mut prev_primal = T::infinity();

        let (status, res) = loop {
            let res = compute_residuals(model, &results.x, &results.y, &mut work.residuals);
            log::log!(
                level,
                "iter {:4}  obj {:+.6e}  pri {:.3e}  dua {:.3e}  mu {:.1e}",
                iter,
                res.objective.as_f64(),
                res.primal.as_f64(),
                res.dual.as_f64(),
                mu.as_f64(),
            );

            if let Some(status) = check_termination(&res, &results.x, &results.y, eps_abs, eps_rel) {
                break (status, res);
            }
            if iter >= settings.max_iter {
                break (QpStatus::MaxIterReached, res);
            }

            if iter > 0 && res.primal > mu_threshold * prev_primal && mu > mu_min {
                mu = (mu * mu_factor).max(mu_min);
                mu_updates += 1;
            }
            prev_primal = res.primal;

            assemble_kkt(&mut work.kkt, model, &work.ata, rho, mu, settings.kkt_layout);
            work.ldl.factorize(
                MatrixView::from_slice(&work.kkt, n, n, settings.kkt_layout),
                settings.strategy,
            );

            // rhs = ρx − g − Aᵀy + (1/μ)Aᵀb   (Aᵀy is still in the scratch)
            let inv_mu = mu.recip();
            for i in 0..n {
                work.rhs[i] = rho * results.x[i] - model.g[i] - work.residuals.aty[i]
                    + inv_mu * work.atb[i];
            }
            work.ldl.solve_in_place(&mut work.rhs);
            results.x.copy_from_slice(&work.rhs);

            // y += (Ax⁺ − b) / μ
            mat_vec(&model.a, &results.x, &mut work.residuals.ax);
            for ((yk, &ax_k), &b_k) in results.y.iter_mut().zip(&work.residuals.ax).zip(model.b.iter()) {
                *yk = *yk + inv_mu * (ax_k - b_k);
            }

            iter += 1;
        };

        results.status = status;
        results.info.iter = iter;
        results.info.mu_updates = mu_updates;
        results.info.mu_eq = mu;
        results.info.objective = res.objective;
        results.info.primal_res = res.primal;
        results.info.dual_res = res.dual;
        results.info.solve_time = start.elapsed();

        log::log!(
            level,
            "dense QP finished: status = {}, iter = {}, obj = {:.6e}",
            status,
            iter,
            res.objective.as_f64(),
        );
    }
}

/// Writes the lower triangle of `H + ρI + (1/μ)AᵀA` into `kkt`.
fn assemble_kkt<T: Scalar>(
    kkt: &mut [T],
    model: &QpData<T>,
    ata: &DMatrix<T>,
    rho: T,
    mu: T,
    layout: Layout,
) {
    let n = model.num_vars();
    let inv_mu = mu.recip();
    let mut k = MatrixViewMut::from_slice(kkt, n, n, layout);
    for j in 0..n {
        for i in j..n {
            let mut v = model.h[(i, j)] + inv_mu * ata[(i, j)];
            if i == j {
                v = v + rho;
            }
            k.write(i, j, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::FactorizationStrategy;
    use nalgebra::DVector;

    fn projection_qp() -> QpData<f64> {
        // min 1/2 ||x||^2 s.t. x1 + x2 + x3 = 3  =>  x = [1, 1, 1], y = -1
        QpData {
            h: DMatrix::identity(3, 3),
            g: DVector::zeros(3),
            a: DMatrix::from_row_slice(1, 3, &[1.0, 1.0, 1.0]),
            b: DVector::from_vec(vec![3.0]),
        }
    }

    #[test]
    fn test_solve_projection() {
        let mut qp = DenseQp::new(3, 1);
        qp.init(projection_qp()).unwrap();
        qp.settings.eps_abs = 1e-9;
        qp.solve();

        let r = qp.results();
        assert_eq!(r.status, QpStatus::Solved, "status = {}", r.status);
        for xi in &r.x {
            assert!((xi - 1.0).abs() < 1e-6, "x = {:?}", r.x);
        }
        assert!((r.y[0] + 1.0).abs() < 1e-6, "y = {:?}", r.y);
        assert!((r.info.objective - 1.5).abs() < 1e-6);
        assert!(r.info.iter > 0);
    }

    #[test]
    fn test_every_layout_and_strategy_agrees() {
        let mut reference: Option<Vec<f64>> = None;
        for layout in [Layout::ColMajor, Layout::RowMajor] {
            for strategy in FactorizationStrategy::ALL {
                let mut qp = DenseQp::new(3, 1);
                qp.init(projection_qp()).unwrap();
                qp.settings.kkt_layout = layout;
                qp.settings.strategy = strategy;
                qp.solve();
                assert_eq!(qp.results.status, QpStatus::Solved);
                match &reference {
                    None => reference = Some(qp.results.x.clone()),
                    Some(x_ref) => {
                        for (a, b) in x_ref.iter().zip(&qp.results.x) {
                            assert!((a - b).abs() < 1e-10);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_unconstrained() {
        // min 1/2 x^T diag(2, 4) x - [2, 4]^T x  =>  x = [1, 1]
        let mut qp = DenseQp::<f64>::new(2, 0);
        qp.init(QpData {
            h: DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]),
            g: DVector::from_vec(vec![-2.0, -4.0]),
            a: DMatrix::zeros(0, 2),
            b: DVector::zeros(0),
        })
        .unwrap();
        qp.solve();
        assert_eq!(qp.results.status, QpStatus::Solved);
        assert!((qp.results.x[0] - 1.0).abs() < 1e-6);
        assert!((qp.results.x[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_hits_max_iter() {
        // x1 + x2 = 1 and x1 + x2 = 2 cannot both hold.
        let mut qp = DenseQp::new(2, 2);
        qp.init(QpData {
            h: DMatrix::identity(2, 2),
            g: DVector::zeros(2),
            a: DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]),
            b: DVector::from_vec(vec![1.0, 2.0]),
        })
        .unwrap();
        qp.settings.max_iter = 25;
        qp.solve();
        assert_eq!(qp.results.status, QpStatus::MaxIterReached);
        assert_eq!(qp.results.info.iter, 25);
    }

    #[test]
    fn test_warm_start_from_solution_needs_no_iterations() {
        let mut qp = DenseQp::new(3, 1);
        qp.init(projection_qp()).unwrap();
        qp.warm_start(&[1.0, 1.0, 1.0], &[-1.0]).unwrap();
        qp.solve();
        assert_eq!(qp.results.status, QpStatus::Solved);
        assert_eq!(qp.results.info.iter, 0);
    }

    #[test]
    fn test_init_rejects_bad_dimensions() {
        let mut qp = DenseQp::<f64>::new(2, 1);
        let err = qp.init(projection_qp()).unwrap_err();
        assert!(matches!(err, ProblemError::DimensionMismatch { .. }));
        assert!(qp.warm_start(&[0.0], &[0.0]).is_err());
    }

    #[test]
    fn test_solve_before_init_is_trivial() {
        let mut qp = DenseQp::<f64>::new(2, 1);
        assert_eq!(qp.results.status, QpStatus::NotRun);
        qp.solve();
        assert_eq!(qp.results.status, QpStatus::Solved);
        assert_eq!(qp.results.x, vec![0.0, 0.0]);
    }
}
