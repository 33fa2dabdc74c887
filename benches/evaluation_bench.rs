//! Performance benchmarks for beat evaluation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stratum_eval::{
    bootstrap_confidence_interval, evaluate_beats, evaluate_downbeats, EvaluationConfig,
};

/// Five minutes of beats at 120 BPM, with a jittered estimate sequence
fn synthetic_track() -> (Vec<f64>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let annotations: Vec<f64> = (0..600).map(|i| i as f64 * 0.5).collect();
    let estimates: Vec<f64> = annotations
        .iter()
        .map(|t| t + rng.gen_range(-0.03..0.03))
        .collect();
    (annotations, estimates)
}

fn bench_evaluate_beats(c: &mut Criterion) {
    let (annotations, estimates) = synthetic_track();
    let config = EvaluationConfig::default();

    c.bench_function("evaluate_beats_5min", |b| {
        b.iter(|| evaluate_beats(black_box(&annotations), black_box(&estimates), &config));
    });
}

fn bench_evaluate_downbeats(c: &mut Criterion) {
    let (annotations, estimates) = synthetic_track();
    let downbeats: Vec<f64> = annotations.iter().step_by(4).copied().collect();
    let estimated: Vec<f64> = estimates.iter().step_by(4).copied().collect();
    let config = EvaluationConfig::default();

    c.bench_function("evaluate_downbeats_5min", |b| {
        b.iter(|| evaluate_downbeats(black_box(&downbeats), black_box(&estimated), &config));
    });
}

fn bench_bootstrap(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let scores: Vec<f64> = (0..200).map(|_| rng.gen_range(40.0..100.0)).collect();

    c.bench_function("bootstrap_1000_samples_200_files", |b| {
        b.iter(|| bootstrap_confidence_interval(black_box(&scores), 1000, 0.95, Some(3)));
    });
}

criterion_group!(
    benches,
    bench_evaluate_beats,
    bench_evaluate_downbeats,
    bench_bootstrap
);
criterion_main!(benches);
