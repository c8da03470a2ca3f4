//! End-to-end tests for the batch scheduler.

mod common;

use common::{infeasible_qp, random_qp};
use ldlt_core::{
    solve_in_parallel, solve_with_options, BatchQp, DenseQp, FactorizationStrategy, Layout,
    ParallelOptions, QpStatus, Solvable,
};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn threads(n: usize) -> Option<NonZeroUsize> {
    NonZeroUsize::new(n)
}

/// Synthetic instance whose solve performs `units` rounds of an LCG.
#[derive(Debug, Clone, PartialEq)]
struct Synthetic {
    units: usize,
    state: u64,
    solves: usize,
}

impl Synthetic {
    fn new(units: usize, seed: u64) -> Self {
        Self { units, state: seed, solves: 0 }
    }
}

impl Solvable for Synthetic {
    fn solve(&mut self) {
        for _ in 0..self.units * 10_000 {
            self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        }
        self.solves += 1;
    }
}

#[test]
fn test_uneven_work_same_state_for_one_and_two_workers() {
    let work = [1, 10, 100, 10, 1];
    let fresh = || -> Vec<Synthetic> {
        work.iter().enumerate().map(|(i, &u)| Synthetic::new(u, i as u64 + 1)).collect()
    };

    let mut serial = fresh();
    solve_in_parallel(&mut serial, threads(1));
    let mut parallel = fresh();
    solve_in_parallel(&mut parallel, threads(2));

    assert_eq!(serial, parallel);
    assert!(parallel.iter().all(|s| s.solves == 1));
}

#[test]
fn test_more_workers_than_instances() {
    let mut batch = vec![Synthetic::new(3, 9), Synthetic::new(1, 4)];
    solve_in_parallel(&mut batch, threads(16));
    assert!(batch.iter().all(|s| s.solves == 1));
}

/// Counts how many distinct calls reach `solve`, from any thread.
struct Shared {
    hits: Arc<AtomicUsize>,
}

impl Solvable for Shared {
    fn solve(&mut self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_every_instance_dispatched_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut batch: Vec<Shared> = (0..100).map(|_| Shared { hits: Arc::clone(&hits) }).collect();
    solve_with_options(&mut batch, &ParallelOptions::with_threads(NonZeroUsize::new(7).unwrap()));
    assert_eq!(hits.load(Ordering::SeqCst), 100);
}

fn build_batch(count: usize) -> BatchQp<f64> {
    let mut batch = BatchQp::new(count);
    for k in 0..count {
        let n = 4 + (k % 5) * 6;
        let n_eq = 1 + k % 3;
        let qp = batch.init_qp_in_place(n, n_eq);
        qp.settings.eps_abs = 1e-9;
        qp.settings.kkt_layout = if k % 2 == 0 { Layout::ColMajor } else { Layout::RowMajor };
        qp.settings.strategy = FactorizationStrategy::ALL[k % 3];
        qp.init(random_qp(n, n_eq, k as u64)).unwrap();
    }
    batch
}

#[test]
fn test_qp_batch_deterministic_across_worker_counts() {
    let mut reference = build_batch(12);
    reference.solve_in_parallel(threads(1));

    for workers in [2, 3, 8] {
        let mut batch = build_batch(12);
        batch.solve_in_parallel(threads(workers));
        for (k, (a, b)) in reference.iter().zip(batch.iter()).enumerate() {
            assert_eq!(a.results.status, b.results.status, "instance {}", k);
            assert_eq!(a.results.info.iter, b.results.info.iter, "instance {}", k);
            assert_eq!(a.results.x, b.results.x, "instance {} with {} workers", k, workers);
            assert_eq!(a.results.y, b.results.y, "instance {} with {} workers", k, workers);
        }
    }
}

#[test]
fn test_qp_batch_solves_to_tolerance() {
    let mut batch = build_batch(10);
    batch.solve_in_parallel(None);
    for (k, qp) in batch.iter().enumerate() {
        let info = &qp.results.info;
        assert_eq!(qp.results.status, QpStatus::Solved, "instance {}", k);
        assert!(info.primal_res <= 1e-9, "instance {}: primal {:e}", k, info.primal_res);
        assert!(info.dual_res <= 1e-9, "instance {}: dual {:e}", k, info.dual_res);
    }
}

#[test]
fn test_failed_instance_does_not_affect_siblings() {
    let mut alone = build_batch(4);
    alone.solve_in_parallel(threads(1));

    let mut mixed = build_batch(4);
    let mut bad = DenseQp::new(3, 2);
    bad.settings.max_iter = 40;
    bad.init(infeasible_qp(3)).unwrap();
    mixed.insert(bad);
    mixed.solve_in_parallel(threads(3));

    assert_eq!(mixed.size(), 5);
    assert_eq!(mixed[4].results.status, QpStatus::MaxIterReached);
    assert_eq!(mixed[4].results.info.iter, 40);
    for k in 0..4 {
        assert_eq!(mixed[k].results.status, QpStatus::Solved);
        assert_eq!(mixed[k].results.x, alone[k].results.x);
    }
}

#[test]
fn test_plain_vec_of_instances() {
    let mut qps: Vec<DenseQp<f64>> = (0..6)
        .map(|k| {
            let mut qp = DenseQp::new(5, 2);
            qp.init(random_qp(5, 2, 100 + k)).unwrap();
            qp
        })
        .collect();
    solve_in_parallel(&mut qps, threads(4));
    assert!(qps.iter().all(|qp| qp.results.status == QpStatus::Solved));
}
