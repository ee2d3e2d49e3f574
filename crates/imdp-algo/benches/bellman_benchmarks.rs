//! Performance benchmarks for the robust Bellman operator's inner loop.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p imdp-algo
//!
//! # Run just the O-max kernel
//! cargo bench -p imdp-algo -- o_maximize
//! ```
//!
//! ## Performance Targets
//!
//! | Operation | 100 states | 1,000 states | 10,000 states |
//! |-----------|------------|---------------|----------------|
//! | Dense O-max column | <1us | <1us | <1us |
//! | Non-factored Bellman step (sequential) | <1ms | <10ms | <150ms |
//! | Non-factored Bellman step (parallel) | <1ms | <5ms | <50ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imdp_core::{
    AmbiguitySet, BellmanAlgorithm, DenseAmbiguitySet, FactoredMdp, InitialStates, Marginal,
};
use imdp_algo::kernels::omax;
use imdp_algo::strategy_cache::StrategyCache;
use imdp_algo::workspace;

/// A chain system of `n` states, each with a single action whose transition
/// is interval-ambiguous between staying put and moving to the next state,
/// terminating in an absorbing last state.
fn chain_system(n: usize) -> FactoredMdp<f64> {
    let n_target = n;
    let n_source = n;
    let mut lower = vec![0.0; n_target * n_source];
    let mut gap = vec![0.0; n_target * n_source];
    for s in 0..n - 1 {
        lower[s * n_target + s] = 0.3;
        gap[s * n_target + (s + 1)] = 0.7;
    }
    lower[(n - 1) * n_target + (n - 1)] = 1.0;
    let set = AmbiguitySet::Dense(DenseAmbiguitySet::from_lower_gap(n_target, n_source, lower, gap).unwrap());
    let marginal = Marginal::new(set, vec![0], vec![0], vec![n], vec![1]).unwrap();
    FactoredMdp::non_factored(n, 1, marginal, InitialStates::All).unwrap()
}

fn bench_o_maximize(c: &mut Criterion) {
    let mut group = c.benchmark_group("o_maximize");

    for &n in &[16usize, 128, 1024] {
        let mut lower = vec![0.0; n];
        let mut upper = vec![0.0; n];
        for i in 0..n {
            lower[i] = 0.0;
            upper[i] = if i % 3 == 0 { 0.5 } else { 0.0 };
        }
        upper[0] = 1.0;
        let ambiguity = AmbiguitySet::Dense(
            DenseAmbiguitySet::from_lower_upper(n, 1, lower, upper).unwrap(),
        );
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();

        group.bench_with_input(BenchmarkId::new("maximize", n), &n, |b, _| {
            b.iter(|| black_box(omax::o_maximize(&ambiguity, 0, &values, true)))
        });
        group.bench_with_input(BenchmarkId::new("minimize", n), &n, |b, _| {
            b.iter(|| black_box(omax::o_maximize(&ambiguity, 0, &values, false)))
        });
    }

    group.finish();
}

fn bench_bellman_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("bellman_step");

    for &n in &[100usize, 1_000, 5_000] {
        let system = chain_system(n);
        let previous = vec![0.0f64; n];

        for &threads in &[1usize, 4] {
            let mut workspace = workspace::construct_workspace(&system, BellmanAlgorithm::OMaximization, threads);
            group.bench_with_input(
                BenchmarkId::new(format!("threads_{threads}"), n),
                &n,
                |b, _| {
                    b.iter(|| {
                        let mut cache = StrategyCache::<f64>::none();
                        let next = imdp_algo::bellman(
                            &system,
                            &previous,
                            &mut workspace,
                            &mut cache,
                            BellmanAlgorithm::OMaximization,
                            false,
                            true,
                            Some(0),
                        )
                        .unwrap();
                        black_box(next)
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_o_maximize, bench_bellman_step);
criterion_main!(benches);
