//! Benchmarks for the embedding estimators and entropy measures.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gait_entropy::clustering::{select_alphabet_size, KMeansConfig};
use gait_entropy::embedding::{estimate_delay, estimate_dimension, reconstruct};
use gait_entropy::entropy::permutation_entropy;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn generate_sine(n: usize, period: f64) -> Vec<f64> {
    (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period).sin())
        .collect()
}

fn generate_gait_like(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            (2.0 * std::f64::consts::PI * t / 100.0).sin()
                + 0.4 * (2.0 * std::f64::consts::PI * t / 50.0).sin()
                + 0.05 * (t * 12.9898).sin().fract()
        })
        .collect()
}

fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("embedding_estimators");

    for size in [256, 512, 1024].iter() {
        let signal = generate_gait_like(*size);

        group.bench_with_input(BenchmarkId::new("AMI_delay", size), size, |b, _| {
            b.iter(|| estimate_delay(black_box(&signal), 50, 32))
        });

        group.bench_with_input(BenchmarkId::new("FNN_dimension", size), size, |b, _| {
            b.iter(|| estimate_dimension(black_box(&signal), 8, 15, 15.0, 0.05).ok())
        });
    }

    group.finish();
}

fn bench_entropy(c: &mut Criterion) {
    let mut group = c.benchmark_group("entropy_measures");

    for size in [1000, 5000, 20000].iter() {
        let signal = generate_sine(*size, 100.0);
        group.bench_with_input(BenchmarkId::new("permutation", size), size, |b, _| {
            b.iter(|| permutation_entropy(black_box(&signal), 4, 1))
        });
    }

    let points = reconstruct(&generate_gait_like(512), 3, 8);
    let base = KMeansConfig::default().n_init(3);
    group.sample_size(10);
    group.bench_function("alphabet_selection_512", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(42);
            select_alphabet_size(black_box(&points), 15, &base, &mut rng)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_estimators, bench_entropy);
criterion_main!(benches);
