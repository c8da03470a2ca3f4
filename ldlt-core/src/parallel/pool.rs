//! Fixed-size worker pool, built per dispatch.
//!
//! The pool only knows how to run N copies of a worker body; what a worker
//! does (pulling from a queue, in the batch solver) is up to the caller.

use std::num::NonZeroUsize;

pub struct WorkerPool {
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// A single worker runs on the calling thread; more get a dedicated
    /// rayon pool. If the pool cannot be built the dispatch degrades to the
    /// calling thread.
    pub fn new(workers: NonZeroUsize) -> Self {
        let workers = workers.get();
        if workers == 1 {
            return Self { workers: 1, pool: None };
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ldlt-batch-{}", i))
            .build()
        {
            Ok(pool) => Self { workers, pool: Some(pool) },
            Err(e) => {
                log::warn!(
                    "could not build a {}-thread pool ({}), running on the calling thread",
                    workers,
                    e
                );
                Self { workers: 1, pool: None }
            }
        }
    }

    /// Number of workers `broadcast` will start.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `body(worker_id)` once per worker and blocks until all return.
    pub fn broadcast<F>(&self, body: F)
    where
        F: Fn(usize) + Sync,
    {
        match &self.pool {
            None => body(0),
            Some(pool) => pool.scope(|scope| {
                let body = &body;
                for worker in 0..self.workers {
                    scope.spawn(move |_| body(worker));
                }
            }),
        }
    }
}
