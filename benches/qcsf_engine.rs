//! Benchmarks the two hot per-trial operations (`select_stimulus` and
//! `update`) and the FFT/bandpass pipeline that backs template synthesis.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use qcsf::bandpass::apply_bandpass_filter;
use qcsf::fft::fft2d;
use qcsf::qcsf_engine::{EngineConfig, QcsfEngine};

fn bench_select_and_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("trial_loop");
    let mut engine = QcsfEngine::new(EngineConfig::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    group.bench_function("select_stimulus", |b| {
        b.iter(|| engine.select_stimulus().unwrap());
    });

    group.bench_function("select_then_update", |b| {
        b.iter(|| {
            let choice = engine.select_stimulus().unwrap();
            let correct = rng.gen_bool(0.5);
            engine.update(choice.stim_index, correct).unwrap();
        });
    });

    group.finish();
}

fn bench_fft2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft2d");
    for &n in &[32usize, 64, 128, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut re = vec![0.0f64; n * n];
            let mut im = vec![0.0f64; n * n];
            re[0] = 1.0;
            b.iter(|| {
                fft2d(&mut re, &mut im, n, false).unwrap();
                fft2d(&mut re, &mut im, n, true).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_bandpass(c: &mut Criterion) {
    let n = 64;
    let image: Vec<f64> = (0..n * n).map(|i| ((i as f64 * 12.9898).sin() * 43758.5453).fract() - 0.5).collect();
    c.bench_function("apply_bandpass_filter_64", |b| {
        b.iter(|| apply_bandpass_filter(&image, n, 4.0, 1.0).unwrap());
    });
}

criterion_group!(benches, bench_select_and_update, bench_fft2d, bench_bandpass);
criterion_main!(benches);
