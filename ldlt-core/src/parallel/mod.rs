//! Batch-parallel solve of independent problem instances.
//!
//! A dispatch builds a pool of workers, hands the instances out one at a
//! time through a [`WorkQueue`], and blocks until the queue is drained.
//! Assignment is dynamic: a worker that finishes a short solve immediately
//! takes the next instance instead of waiting on a fixed partition.
//!
//! Instances share no state, so the final state of each one does not depend
//! on the number of workers or on which worker processed it. A failed solve
//! only shows up in that instance's own status.

pub mod batch;
pub mod pool;
pub mod queue;

pub use batch::BatchQp;
pub use pool::WorkerPool;
pub use queue::WorkQueue;

use crate::linalg::Scalar;
use crate::qp::DenseQp;
use std::num::NonZeroUsize;
use std::time::Instant;

/// A unit of work with its own iterative solve routine.
pub trait Solvable {
    /// Runs the solve to completion, recording the outcome internally.
    fn solve(&mut self);
}

impl<T: Scalar> Solvable for DenseQp<T> {
    fn solve(&mut self) {
        DenseQp::solve(self)
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelOptions {
    /// Upper bound on workers; a dispatch never uses more than the batch size.
    pub num_threads: NonZeroUsize,
}

impl ParallelOptions {
    pub fn with_threads(num_threads: NonZeroUsize) -> Self {
        Self { num_threads }
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        // LDLT_BATCH_THREADS overrides the hardware-derived default
        let num_threads = std::env::var("LDLT_BATCH_THREADS")
            .ok()
            .and_then(|s| s.parse::<NonZeroUsize>().ok())
            .unwrap_or_else(default_num_threads);
        Self { num_threads }
    }
}

/// Half the available hardware parallelism, at least one.
pub fn default_num_threads() -> NonZeroUsize {
    let hw = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    NonZeroUsize::new(hw / 2).unwrap_or(NonZeroUsize::MIN)
}

/// Solves every instance, using `num_threads` workers or the default.
///
/// Blocks until all instances are done.
pub fn solve_in_parallel<S>(instances: &mut [S], num_threads: Option<NonZeroUsize>)
where
    S: Solvable + Send,
{
    let options = match num_threads {
        Some(n) => ParallelOptions::with_threads(n),
        None => ParallelOptions::default(),
    };
    solve_with_options(instances, &options);
}

/// Like [`solve_in_parallel`] with an explicit configuration value.
pub fn solve_with_options<S>(instances: &mut [S], options: &ParallelOptions)
where
    S: Solvable + Send,
{
    let batch_size = instances.len();
    let Some(workers) = NonZeroUsize::new(options.num_threads.get().min(batch_size)) else {
        return;
    };

    let start = Instant::now();
    let pool = WorkerPool::new(workers);
    let queue = WorkQueue::new(instances);
    pool.broadcast(|worker| {
        run_worker(worker, &queue);
    });

    log::debug!(
        "solved batch of {} with {} workers in {:?}",
        batch_size,
        pool.workers(),
        start.elapsed()
    );
}

fn run_worker<S: Solvable>(worker: usize, queue: &WorkQueue<'_, S>) -> usize {
    let mut done = 0;
    while let Some((idx, instance)) = queue.pop() {
        log::trace!("worker {} solving instance {}/{}", worker, idx, queue.len());
        instance.solve();
        done += 1;
    }
    log::trace!("worker {} drained the queue after {} instances", worker, done);
    done
}
