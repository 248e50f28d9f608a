//! Performance benchmarks for the WSOLA engine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lento_stretch::{stretch, SearchResolution, WsolaConfig, WsolaEngine};

fn sine(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 48000.0).sin() * 0.5)
        .collect()
}

fn bench_process(c: &mut Criterion, name: &str, resolution: SearchResolution) {
    let config = WsolaConfig::new(2).resolution(resolution);
    let mut engine = match WsolaEngine::new(config) {
        Ok(engine) => engine,
        Err(err) => panic!("engine config rejected: {err}"),
    };
    let signal = sine(engine.max_input_samples_required());
    let block = [&signal[..], &signal[..]];

    // Prime so every iteration runs the similarity search
    let _ = engine.process(1.0, &block);

    c.bench_function(name, |b| {
        b.iter(|| {
            let _ = engine.process(black_box(1.1), black_box(&block));
        });
    });
}

fn bench_hop_resolution(c: &mut Criterion) {
    bench_process(c, "process_stereo_hop_search", SearchResolution::Hop);
}

fn bench_sample_resolution(c: &mut Criterion) {
    bench_process(c, "process_stereo_sample_search", SearchResolution::Sample);
}

fn bench_offline(c: &mut Criterion) {
    // 5 seconds at 48kHz
    let samples = [sine(48000 * 5)];
    let config = WsolaConfig::new(1);

    c.bench_function("stretch_mono_5s_half_speed", |b| {
        b.iter(|| {
            let _ = stretch(config.clone(), black_box(0.5), black_box(&samples));
        });
    });
}

criterion_group!(
    benches,
    bench_hop_resolution,
    bench_sample_resolution,
    bench_offline
);
criterion_main!(benches);
