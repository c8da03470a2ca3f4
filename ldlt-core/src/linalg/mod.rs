//! Dense linear algebra layer.
//!
//! Strided views, the layout-adaptation strategy, the LDL^T kernel and an
//! owning factorization workspace.

pub mod dense;
pub mod ldlt;
pub mod scalar;
pub mod strategy;
pub mod view;

pub use dense::DenseLdlt;
pub use ldlt::{factorize, factorize_in_place, reconstruct, solve_in_place};
pub use scalar::Scalar;
pub use strategy::FactorizationStrategy;
pub use view::{Layout, LdltView, LdltViewMut, MatrixView, MatrixViewMut, VectorView, VectorViewMut};
