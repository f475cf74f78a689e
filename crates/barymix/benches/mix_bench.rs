//! Criterion benchmarks for the per-move clamp + solve path.
//! Focus sizes: n in {1, 2, 3, 6, 12} anchors; every move event runs one
//! boundary clamp and one bounded-size linear solve.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use barymix::prelude::*;

fn random_path(len: usize, seed: u64) -> Vec<Vector2<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            Vector2::new(
                rng.gen_range(-50.0..350.0),
                rng.gen_range(-50.0..350.0),
            )
        })
        .collect()
}

fn fresh_mixer(n: usize) -> Mixer {
    let reg = ScopeRegistry::new();
    Mixer::new(&LayoutSpec::Auto(n), &LayoutCfg::default(), reg.allocate()).unwrap()
}

fn bench_move_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer");
    let path = random_path(64, 43);
    for &n in &[1usize, 2, 3, 6, 12] {
        group.bench_with_input(BenchmarkId::new("clamp_solve", n), &n, |b, &n| {
            b.iter_batched(
                || fresh_mixer(n),
                |mut m| {
                    m.input(PointerSignal::Start(path[0]));
                    for p in &path[1..] {
                        let _ = m.input(PointerSignal::Move(*p));
                    }
                    m.input(PointerSignal::End);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_move_events);
criterion_main!(benches);
