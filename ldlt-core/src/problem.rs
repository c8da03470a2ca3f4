//! Problem data structures, settings and results for the dense QP instance.

use crate::linalg::{FactorizationStrategy, Layout, Scalar};
use nalgebra::{DMatrix, DVector};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Equality-constrained convex QP.
///
/// ```text
/// minimize    (1/2) x^T H x + g^T x
/// subject to  A x = b
/// ```
///
/// # Dimensions
///
/// - `n`: number of primal variables (length of x)
/// - `n_eq`: number of equality constraints (length of b, rows of A)
/// - H: n × n (symmetric, PSD)
/// - g: n
/// - A: n_eq × n
/// - b: n_eq
#[derive(Debug, Clone)]
pub struct QpData<T: Scalar> {
    /// Quadratic cost matrix (both triangles populated)
    pub h: DMatrix<T>,
    /// Linear cost vector
    pub g: DVector<T>,
    /// Equality constraint matrix
    pub a: DMatrix<T>,
    /// Equality right-hand side
    pub b: DVector<T>,
}

/// Setup errors. Returned by [`crate::DenseQp::init`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// A matrix or vector does not match the instance dimensions
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which piece of data is wrong
        what: &'static str,
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// H is not symmetric
    #[error("H is not symmetric: H[{row},{col}] != H[{col},{row}]")]
    NotSymmetric {
        /// Row of the offending entry
        row: usize,
        /// Column of the offending entry
        col: usize,
    },

    /// NaN or infinite input
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}

impl<T: Scalar> QpData<T> {
    /// All-zero problem of the given size.
    pub fn zeros(n: usize, n_eq: usize) -> Self {
        Self {
            h: DMatrix::zeros(n, n),
            g: DVector::zeros(n),
            a: DMatrix::zeros(n_eq, n),
            b: DVector::zeros(n_eq),
        }
    }

    /// Number of primal variables (n)
    pub fn num_vars(&self) -> usize {
        self.g.len()
    }

    /// Number of equality constraints (n_eq)
    pub fn num_eq(&self) -> usize {
        self.b.len()
    }

    /// Validates dimensions against `(n, n_eq)`, symmetry of H and finiteness.
    pub fn validate(&self, n: usize, n_eq: usize) -> Result<(), ProblemError> {
        let checks: [(&'static str, usize, usize); 7] = [
            ("H rows", n, self.h.nrows()),
            ("H cols", n, self.h.ncols()),
            ("g", n, self.g.len()),
            ("A rows", n_eq, self.a.nrows()),
            ("A cols", n, self.a.ncols()),
            ("b", n_eq, self.b.len()),
            ("A cols vs H", self.h.ncols(), self.a.ncols()),
        ];
        for (what, expected, actual) in checks {
            if expected != actual {
                return Err(ProblemError::DimensionMismatch { what, expected, actual });
            }
        }

        let finite = |s: &[T]| s.iter().all(|v| v.is_finite());
        if !finite(self.h.as_slice()) {
            return Err(ProblemError::NonFinite("H"));
        }
        if !finite(self.g.as_slice()) {
            return Err(ProblemError::NonFinite("g"));
        }
        if !finite(self.a.as_slice()) {
            return Err(ProblemError::NonFinite("A"));
        }
        if !finite(self.b.as_slice()) {
            return Err(ProblemError::NonFinite("b"));
        }

        // Relative symmetry check; the KKT assembly reads only the lower triangle.
        let tol = T::of_f64(1e3) * T::epsilon();
        for j in 0..n {
            for i in j + 1..n {
                let lo = self.h[(i, j)];
                let up = self.h[(j, i)];
                let scale = T::one().max(lo.abs()).max(up.abs());
                if (lo - up).abs() > tol * scale {
                    return Err(ProblemError::NotSymmetric { row: i, col: j });
                }
            }
        }

        Ok(())
    }
}

/// Where the first iterate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialGuess {
    /// Start from x = 0, y = 0.
    #[default]
    NoInitialGuess,
    /// Start from whatever is stored in the results (previous solve or
    /// explicit warm start).
    WarmStartWithPreviousResult,
}

/// Solver settings and parameters.
#[derive(Debug, Clone)]
pub struct QpSettings {
    /// Maximum number of outer iterations (one factorization each)
    pub max_iter: usize,

    /// Absolute feasibility tolerance
    pub eps_abs: f64,

    /// Relative feasibility tolerance
    pub eps_rel: f64,

    /// Primal proximal parameter ρ (also the KKT diagonal regularization)
    pub rho: f64,

    /// Initial equality penalty μ
    pub mu_eq: f64,

    /// Floor for μ
    pub mu_min_eq: f64,

    /// Factor applied to μ when the primal residual stalls
    pub mu_update_factor: f64,

    /// Required per-iteration primal residual reduction before μ is kept
    pub mu_update_threshold: f64,

    /// Layout of the KKT matrix handed to the kernel
    pub kkt_layout: Layout,

    /// Layout-adaptation strategy for the kernel
    pub strategy: FactorizationStrategy,

    /// Initial iterate policy
    pub initial_guess: InitialGuess,

    /// Enable per-iteration logging at info level
    pub verbose: bool,
}

impl Default for QpSettings {
    fn default() -> Self {
        // LDLT_MAX_ITER overrides the iteration budget
        let max_iter = std::env::var("LDLT_MAX_ITER")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1000);

        Self {
            max_iter,
            eps_abs: 1e-8,
            eps_rel: 0.0,
            rho: 1e-6,
            mu_eq: 1e-3,
            mu_min_eq: 1e-9,
            mu_update_factor: 0.1,
            mu_update_threshold: 0.5,
            kkt_layout: Layout::ColMajor,
            strategy: FactorizationStrategy::Standard,
            initial_guess: InitialGuess::NoInitialGuess,
            verbose: crate::util::logging::verbose_from_env(),
        }
    }
}

/// Solution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QpStatus {
    /// `solve` has not been called since the last `init`
    #[default]
    NotRun,

    /// Primal and dual residuals within tolerance
    Solved,

    /// Maximum iterations reached
    MaxIterReached,

    /// Non-finite iterate (typically a breakdown in the factorization)
    NumericalError,
}

impl fmt::Display for QpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QpStatus::NotRun => write!(f, "Not Run"),
            QpStatus::Solved => write!(f, "Solved"),
            QpStatus::MaxIterReached => write!(f, "Max Iter Reached"),
            QpStatus::NumericalError => write!(f, "Numerical Error"),
        }
    }
}

/// Detailed solve information and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct QpInfo<T> {
    /// Number of iterations completed
    pub iter: usize,

    /// Number of μ decreases
    pub mu_updates: usize,

    /// Final μ
    pub mu_eq: T,

    /// Objective value at the final iterate
    pub objective: T,

    /// Final primal residual ‖Ax − b‖∞
    pub primal_res: T,

    /// Final dual residual ‖Hx + g + Aᵀy‖∞
    pub dual_res: T,

    /// Time spent in `init`
    pub setup_time: Duration,

    /// Time spent in the last `solve`
    pub solve_time: Duration,
}

/// Solve result with solution and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct QpResults<T> {
    /// Primal solution x (length n)
    pub x: Vec<T>,

    /// Equality multipliers y (length n_eq)
    pub y: Vec<T>,

    /// Solution status
    pub status: QpStatus,

    /// Detailed solve information
    pub info: QpInfo<T>,
}

impl<T: Scalar> QpResults<T> {
    pub(crate) fn new(n: usize, n_eq: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); n_eq],
            status: QpStatus::NotRun,
            info: QpInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> QpData<f64> {
        QpData {
            h: DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]),
            g: DVector::from_vec(vec![1.0, -1.0]),
            a: DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
            b: DVector::from_vec(vec![1.0]),
        }
    }

    #[test]
    fn test_validate_ok() {
        let data = tiny();
        assert_eq!(data.num_vars(), 2);
        assert_eq!(data.num_eq(), 1);
        assert!(data.validate(2, 1).is_ok());
    }

    #[test]
    fn test_validate_dimension_mismatch() {
        let data = tiny();
        let err = data.validate(2, 2).unwrap_err();
        assert_eq!(
            err,
            ProblemError::DimensionMismatch { what: "A rows", expected: 2, actual: 1 }
        );
        assert!(err.to_string().contains("A rows"));
    }

    #[test]
    fn test_validate_not_symmetric() {
        let mut data = tiny();
        data.h[(1, 0)] = 5.0;
        assert_eq!(data.validate(2, 1), Err(ProblemError::NotSymmetric { row: 1, col: 0 }));
    }

    #[test]
    fn test_validate_non_finite() {
        let mut data = tiny();
        data.b[0] = f64::NAN;
        assert_eq!(data.validate(2, 1), Err(ProblemError::NonFinite("b")));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(QpStatus::MaxIterReached.to_string(), "Max Iter Reached");
        assert_eq!(QpStatus::default(), QpStatus::NotRun);
    }
}
