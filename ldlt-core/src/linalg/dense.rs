//! Owning LDL^T workspace.
//!
//! Keeps the L and D buffers alive across repeated factorizations of
//! matrices with the same dimension, so an iterative solver does not
//! reallocate them every iteration.

use super::ldlt;
use super::scalar::Scalar;
use super::strategy::FactorizationStrategy;
use super::view::{Layout, LdltView, LdltViewMut, MatrixView, MatrixViewMut, VectorView, VectorViewMut};

/// Dense LDL^T factorization with owned storage.
#[derive(Debug, Clone)]
pub struct DenseLdlt<T> {
    n: usize,
    layout: Layout,
    l: Vec<T>,
    d: Vec<T>,
    factorized: bool,
}

impl<T: Scalar> DenseLdlt<T> {
    /// Creates an empty n×n workspace storing L in `layout`.
    pub fn new(n: usize, layout: Layout) -> Self {
        Self {
            n,
            layout,
            l: vec![T::zero(); n * n],
            d: vec![T::zero(); n],
            factorized: false,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Whether a factorization has been computed since the last resize.
    #[inline]
    pub fn is_factorized(&self) -> bool {
        self.factorized
    }

    /// Changes the dimension, discarding any previous factor.
    pub fn resize(&mut self, n: usize) {
        self.n = n;
        self.l.clear();
        self.l.resize(n * n, T::zero());
        self.d.clear();
        self.d.resize(n, T::zero());
        self.factorized = false;
    }

    /// Factorizes `a` (lower triangle read) into the owned buffers.
    pub fn factorize(&mut self, a: MatrixView<'_, T>, strategy: FactorizationStrategy) {
        let n = self.n;
        let layout = self.layout;
        ldlt::factorize(
            LdltViewMut::new(
                MatrixViewMut::from_slice(&mut self.l, n, n, layout),
                VectorViewMut::from_slice(&mut self.d),
            ),
            a,
            strategy,
        );
        self.factorized = true;
    }

    /// Solves `A x = b` with the current factor; `rhs` holds b on entry.
    pub fn solve_in_place(&self, rhs: &mut [T]) {
        assert!(self.is_factorized(), "solve called before factorize");
        ldlt::solve_in_place(self.as_view(), VectorViewMut::from_slice(rhs));
    }

    /// Unit lower factor. Only the lower triangle is meaningful.
    pub fn l(&self) -> MatrixView<'_, T> {
        MatrixView::from_slice(&self.l, self.n, self.n, self.layout)
    }

    pub fn d(&self) -> &[T] {
        &self.d
    }

    pub fn as_view(&self) -> LdltView<'_, T> {
        LdltView::new(self.l(), VectorView::from_slice(&self.d))
    }

    /// `L diag(D) L^T` as a packed matrix in this workspace's layout.
    pub fn reconstruct(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.n * self.n];
        ldlt::reconstruct(
            MatrixViewMut::from_slice(&mut out, self.n, self.n, self.layout),
            self.as_view(),
        );
        out
    }

    /// Smallest pivot, or `None` for an empty factor.
    pub fn min_pivot(&self) -> Option<T> {
        self.d.iter().copied().reduce(T::min)
    }
}
