//! Dynamic work queue over a batch of exclusively-owned instances.
//!
//! Workers pull one instance at a time. The queue cursor is the only state
//! shared between workers; each `&mut` it hands out is unique, so instance
//! data itself needs no locking.

use parking_lot::Mutex;
use std::iter::Enumerate;
use std::slice::IterMut;

pub struct WorkQueue<'a, S> {
    cursor: Mutex<Enumerate<IterMut<'a, S>>>,
    len: usize,
}

impl<'a, S> WorkQueue<'a, S> {
    pub fn new(items: &'a mut [S]) -> Self {
        let len = items.len();
        Self { cursor: Mutex::new(items.iter_mut().enumerate()), len }
    }

    /// Next unclaimed item and its index in the batch, or `None` when drained.
    #[inline]
    pub fn pop(&self) -> Option<(usize, &'a mut S)> {
        self.cursor.lock().next()
    }

    /// Total number of items, claimed or not.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
