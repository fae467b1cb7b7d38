//! Emptiness checker benchmarks.
//!
//! Compares the three algorithms on generated automata of growing size, on the
//! generalized automaton and on its single-set conversion.
//!
//! Run with:
//! ```bash
//! cargo bench --bench emptiness
//! ```

use std::hint::black_box;

use buchi_rs::automaton::Automaton;
use buchi_rs::check::Algorithm;
use buchi_rs::degeneralize::to_single_set;
use buchi_rs::generator::{generate, GeneratorOptions};
use buchi_rs::types::StateId;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Helpers
// ============================================================================

fn generated(states: usize, sets: usize, seed: u64) -> Automaton {
    let opts = GeneratorOptions {
        states,
        trees: 3,
        sets,
        edges: 2,
        seed,
    };
    match generate(&opts) {
        Ok(aut) => aut,
        Err(e) => panic!("generator failed: {}", e),
    }
}

/// A ring of `n` states where only the closing edge carries all sets.
/// Every checker has to explore the whole ring.
fn ring(n: u32, sets: usize) -> Automaton {
    let mut aut = Automaton::with_states(n as usize, sets).unwrap();
    aut.add_initial(StateId::new(0)).unwrap();
    for i in 0..n - 1 {
        aut.add_transition_sets(StateId::new(i), StateId::new(i + 1), []).unwrap();
    }
    aut.add_transition_sets(StateId::new(n - 1), StateId::new(0), 0..sets).unwrap();
    aut
}

// ============================================================================
// Benchmark: generated automata
// ============================================================================

fn bench_generated(c: &mut Criterion) {
    let mut group = c.benchmark_group("emptiness/generated");

    for states in [100, 1_000, 10_000] {
        let aut = generated(states, 3, 42);
        group.throughput(Throughput::Elements(aut.num_transitions() as u64));
        for alg in Algorithm::ALL {
            group.bench_with_input(BenchmarkId::new(alg.name(), states), &aut, |b, aut| {
                b.iter(|| black_box(alg.check(aut)));
            });
        }
    }

    group.finish();
}

// ============================================================================
// Benchmark: generalized vs converted
// ============================================================================

fn bench_degeneralized(c: &mut Criterion) {
    let mut group = c.benchmark_group("emptiness/degeneralized");

    let nga = generated(2_000, 4, 7);
    let nba = to_single_set(&nga).unwrap().unwrap();

    group.bench_function("convert", |b| b.iter(|| to_single_set(black_box(&nga))));
    for alg in Algorithm::ALL {
        group.bench_with_input(BenchmarkId::new(alg.name(), "nga"), &nga, |b, aut| {
            b.iter(|| black_box(alg.check(aut)));
        });
        group.bench_with_input(BenchmarkId::new(alg.name(), "nba"), &nba, |b, aut| {
            b.iter(|| black_box(alg.check(aut)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: worst-case ring
// ============================================================================

fn bench_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("emptiness/ring");

    for n in [1_000, 10_000] {
        let aut = ring(n, 4);
        for alg in Algorithm::ALL {
            group.bench_with_input(BenchmarkId::new(alg.name(), n), &aut, |b, aut| {
                b.iter(|| black_box(alg.check(aut)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_generated, bench_degeneralized, bench_ring);

criterion_main!(benches);
