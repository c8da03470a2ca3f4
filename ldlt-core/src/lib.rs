//! Layout-aware dense LDLᵀ factorization and batch-parallel QP solving.
//!
//! This library provides:
//!
//! - **Strided views**: non-owning row- or column-major matrix and vector
//!   descriptors over borrowed slices
//! - **LDLᵀ kernel**: unpivoted factorization of a symmetric positive
//!   definite matrix into unit lower-triangular L and diagonal D, with a
//!   choice of layout-adaptation strategy
//! - **Dense QP instances**: equality-constrained QPs whose iterative solve
//!   refactorizes a KKT matrix with the kernel every iteration
//! - **Batch scheduler**: many independent instances solved across a worker
//!   pool with dynamic assignment
//!
//! # Layout strategies
//!
//! `FactorizationStrategy::Standard` factors directly in the destination's
//! storage order. `DeferToColMajor` / `DeferToRowMajor` factor in a
//! temporary of the named layout when the destination has the other one,
//! then copy the result back. All three give the same factor up to rounding.
//!
//! # Example
//!
//! ```ignore
//! use ldlt_core::{BatchQp, QpData, QpStatus};
//! use nalgebra::{DMatrix, DVector};
//!
//! let mut batch = BatchQp::<f64>::new(2);
//! for rhs in [1.0, 2.0] {
//!     // min 1/2 ||x||^2 s.t. x1 + x2 = rhs
//!     batch.init_qp_in_place(2, 1).init(QpData {
//!         h: DMatrix::identity(2, 2),
//!         g: DVector::zeros(2),
//!         a: DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
//!         b: DVector::from_vec(vec![rhs]),
//!     })?;
//! }
//!
//! batch.solve_in_parallel(None);
//! assert!(batch.iter().all(|qp| qp.results.status == QpStatus::Solved));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod linalg;
pub mod parallel;
pub mod problem;
pub mod qp;
pub mod util;

// Re-export main types
pub use linalg::{
    DenseLdlt, FactorizationStrategy, Layout, LdltView, LdltViewMut, MatrixView, MatrixViewMut,
    Scalar, VectorView, VectorViewMut,
};
pub use parallel::{solve_in_parallel, solve_with_options, BatchQp, ParallelOptions, Solvable};
pub use problem::{
    InitialGuess, ProblemError, QpData, QpInfo, QpResults, QpSettings, QpStatus,
};
pub use qp::DenseQp;
