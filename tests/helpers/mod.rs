//! Test helpers and fixtures for lento integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (silence in, silence out)
//! - `DSP_EPSILON` (1e-4): Overlap-add reconstruction
//! - `PERCEPTUAL_EPSILON` (0.001): Perceptual equivalence (-60dB)
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use lento::prelude::*;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Small engine used by the scenario tests: N = 8, NO2 = 4, L = 20.
pub fn small_config(channels: usize) -> WsolaConfig {
    WsolaConfig::new(channels).window_size(8)
}

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Generate a periodic signal by repeating one precomputed sine cycle.
///
/// Every period is bit-identical, unlike `generate_sine`.
pub fn generate_periodic_sine(period: usize, num_samples: usize) -> Vec<f32> {
    let cycle: Vec<f32> = (0..period)
        .map(|i| (2.0 * std::f32::consts::PI * i as f32 / period as f32).sin())
        .collect();
    (0..num_samples).map(|i| cycle[i % period]).collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Generate an impulse signal (single sample at 1.0, rest zeros).
pub fn generate_impulse(num_samples: usize, position: usize) -> Vec<f32> {
    let mut samples = vec![0.0; num_samples];
    if position < num_samples {
        samples[position] = 1.0;
    }
    samples
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            // 31 bits left after the shift
            ((rng >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
        })
        .collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}

/// Everything observed while driving an engine through a whole stream.
#[derive(Debug, Default)]
pub struct Run {
    /// Concatenated output, one row per channel.
    pub output: Vec<Vec<f32>>,
    /// Value returned by each `process` call, in order.
    pub required: Vec<usize>,
    /// Search offset chosen by each `process` call.
    pub offsets: Vec<usize>,
    /// Number of `process` calls made while draining.
    pub drain_calls: usize,
}

/// Drive `engine` through `input` at a constant `time_scale` following the
/// caller contract: exact requests, zero-padded last block, then drain.
pub fn run_stream(engine: &mut WsolaEngine, time_scale: f32, input: &[Vec<f32>]) -> Run {
    let channels = engine.channels();
    let total = input.frames();
    let mut run = Run {
        output: vec![Vec::new(); channels],
        ..Run::default()
    };
    let mut staging = Frames::new(channels, engine.max_input_samples_required());
    let mut position = 0;

    while position < total {
        let needed = engine.samples_required();
        let available = needed.min(total - position);
        for ch in 0..channels {
            let row = staging.channel_mut(ch);
            row[..available].copy_from_slice(&input[ch][position..position + available]);
            row[available..needed].fill(0.0);
        }
        position += available;

        let next = engine
            .process(time_scale, &staging)
            .expect("block matches the engine request");
        collect(engine, &mut run, next);
    }

    let silence: [&[f32]; 0] = [];
    while engine.no_more_audio() > 0 {
        let next = engine
            .process(time_scale, &silence[..])
            .expect("draining accepts any block");
        collect(engine, &mut run, next);
        run.drain_calls += 1;
    }

    run
}

fn collect(engine: &WsolaEngine, run: &mut Run, next: usize) {
    for (ch, row) in run.output.iter_mut().enumerate() {
        row.extend_from_slice(engine.output().channel(ch));
    }
    run.required.push(next);
    run.offsets.push(engine.last_offset());
}
