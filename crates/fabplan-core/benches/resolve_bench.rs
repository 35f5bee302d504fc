//! Criterion benchmarks for the resolver.
//!
//! Two benchmark groups:
//! - `shallow_catalog`: the early-game fixture, three to four levels deep
//! - `deep_chain`: linear chains of 50 and 500 steps, ratio close to 1 so
//!   rates stay in a sane range

use criterion::{criterion_group, criterion_main, Criterion};
use fabplan_core::policy::Policy;
use fabplan_core::resolver::Resolver;
use fabplan_core::test_utils::{chain_catalog, early_game_catalog};
use std::hint::black_box;

fn bench_shallow(c: &mut Criterion) {
    let catalog = early_game_catalog();
    let resolver = Resolver::new(&catalog);
    let policy = Policy::new();

    c.bench_function("shallow_catalog/motor_60", |b| {
        b.iter(|| {
            let result = resolver
                .resolve(black_box(&policy), black_box("Motor"), black_box(60.0))
                .unwrap();
            black_box(result)
        });
    });
}

fn bench_deep_chain(c: &mut Criterion) {
    let policy = Policy::new();
    for depth in [50usize, 500] {
        let catalog = chain_catalog(depth, 1.01);
        let resolver = Resolver::new(&catalog);
        c.bench_function(&format!("deep_chain/depth_{depth}"), |b| {
            b.iter(|| {
                let result = resolver
                    .resolve(black_box(&policy), black_box("item_0"), black_box(10.0))
                    .unwrap();
                black_box(result)
            });
        });
    }
}

criterion_group!(benches, bench_shallow, bench_deep_chain);
criterion_main!(benches);
