//! Batch QP example.
//!
//! Solves a family of projections onto hyperplanes:
//!   minimize    1/2 ||x - c||^2
//!   subject to  sum(x) = k
//!
//! for k = 1..=8, with every combination of KKT layout and factorization
//! strategy, and reports the per-instance outcome.
//!
//! Optimal solution: x = c + (k - sum(c)) / n, for every instance.

use ldlt_core::{BatchQp, FactorizationStrategy, Layout, QpData, QpStatus};
use nalgebra::{DMatrix, DVector};
use std::num::NonZeroUsize;
use std::time::Instant;

const N: usize = 6;

fn main() {
    println!("Dense LDLT - Batch QP Example");
    println!("=============================");
    println!();

    let c = DVector::from_fn(N, |i, _| i as f64 * 0.25);
    let layouts = [Layout::ColMajor, Layout::RowMajor];

    let mut batch = BatchQp::<f64>::new(8 * layouts.len() * FactorizationStrategy::ALL.len());
    for k in 1..=8 {
        for layout in layouts {
            for strategy in FactorizationStrategy::ALL {
                // g = -c, so H x + g = x - c
                let data = QpData {
                    h: DMatrix::identity(N, N),
                    g: -&c,
                    a: DMatrix::from_element(1, N, 1.0),
                    b: DVector::from_element(1, k as f64),
                };
                let qp = batch.init_qp_in_place(N, 1);
                qp.settings.kkt_layout = layout;
                qp.settings.strategy = strategy;
                if let Err(e) = qp.init(data) {
                    eprintln!("Setup failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    let start = Instant::now();
    batch.solve_in_parallel(NonZeroUsize::new(4));
    let elapsed = start.elapsed();

    println!("{:>3}  {:>9}  {:>16}  {:>10}  {:>5}  {:>10}", "#", "layout", "strategy", "status", "iter", "max err");
    let mut failures = 0;
    for (i, qp) in batch.iter().enumerate() {
        let k = qp.model().b[0];
        let shift = (k - c.sum()) / N as f64;
        let err = qp
            .results
            .x
            .iter()
            .zip(c.iter())
            .map(|(x, ci)| (x - (ci + shift)).abs())
            .fold(0.0, f64::max);
        if qp.results.status != QpStatus::Solved {
            failures += 1;
        }
        println!(
            "{:>3}  {:>9}  {:>16}  {:>10}  {:>5}  {:>10.2e}",
            i,
            format!("{:?}", qp.settings.kkt_layout),
            format!("{:?}", qp.settings.strategy),
            qp.results.status.to_string(),
            qp.results.info.iter,
            err
        );
    }

    println!();
    println!("Solved {} instances in {:?} ({} failed)", batch.size(), elapsed, failures);
}
