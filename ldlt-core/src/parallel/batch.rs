//! Owning container for a batch of dense QP instances.

use super::ParallelOptions;
use crate::linalg::Scalar;
use crate::qp::DenseQp;
use std::num::NonZeroUsize;
use std::ops::{Index, IndexMut};

/// An ordered collection of independent [`DenseQp`] instances.
///
/// Indices are stable: the i-th instance added is the i-th instance
/// reported, whatever worker ended up solving it.
#[derive(Debug, Clone)]
pub struct BatchQp<T: Scalar> {
    qps: Vec<DenseQp<T>>,
}

impl<T: Scalar> BatchQp<T> {
    /// Empty batch with room for `batch_size` instances.
    pub fn new(batch_size: usize) -> Self {
        Self { qps: Vec::with_capacity(batch_size) }
    }

    /// Constructs an instance at the end of the batch and returns it for
    /// `init` and settings edits.
    pub fn init_qp_in_place(&mut self, dim: usize, n_eq: usize) -> &mut DenseQp<T> {
        let idx = self.qps.len();
        self.qps.push(DenseQp::new(dim, n_eq));
        &mut self.qps[idx]
    }

    /// Appends an already built instance.
    pub fn insert(&mut self, qp: DenseQp<T>) {
        self.qps.push(qp);
    }

    /// Instance `i`. Panics if `i` is out of range.
    pub fn get(&self, i: usize) -> &DenseQp<T> {
        assert!(i < self.qps.len(), "index {} out of range for batch of {}", i, self.qps.len());
        &self.qps[i]
    }

    /// Instance `i`. Panics if `i` is out of range.
    pub fn get_mut(&mut self, i: usize) -> &mut DenseQp<T> {
        assert!(i < self.qps.len(), "index {} out of range for batch of {}", i, self.qps.len());
        &mut self.qps[i]
    }

    /// Number of instances.
    #[inline]
    pub fn size(&self) -> usize {
        self.qps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.qps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DenseQp<T>> {
        self.qps.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, DenseQp<T>> {
        self.qps.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [DenseQp<T>] {
        &mut self.qps
    }

    /// Solves every instance. `None` uses [`ParallelOptions::default`].
    pub fn solve_in_parallel(&mut self, num_threads: Option<NonZeroUsize>) {
        super::solve_in_parallel(&mut self.qps, num_threads);
    }

    pub fn solve_with_options(&mut self, options: &ParallelOptions) {
        super::solve_with_options(&mut self.qps, options);
    }
}

impl<T: Scalar> Default for BatchQp<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: Scalar> Index<usize> for BatchQp<T> {
    type Output = DenseQp<T>;

    fn index(&self, i: usize) -> &DenseQp<T> {
        self.get(i)
    }
}

impl<T: Scalar> IndexMut<usize> for BatchQp<T> {
    fn index_mut(&mut self, i: usize) -> &mut DenseQp<T> {
        self.get_mut(i)
    }
}

impl<T: Scalar> From<Vec<DenseQp<T>>> for BatchQp<T> {
    fn from(qps: Vec<DenseQp<T>>) -> Self {
        Self { qps }
    }
}

impl<'a, T: Scalar> IntoIterator for &'a BatchQp<T> {
    type Item = &'a DenseQp<T>;
    type IntoIter = std::slice::Iter<'a, DenseQp<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.qps.iter()
    }
}
