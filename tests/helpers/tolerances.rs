//! Tolerance constants for time-scale tests.
//!
//! Different checks require different precision levels.

/// Floating point rounding errors (sample-exact passthrough at unity scale).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Overlap-add reconstruction tolerance (window coefficients summed in f32).
pub const DSP_EPSILON: f32 = 1e-4;

/// Audio perceptual tolerance (~-60dB, inaudible differences).
pub const PERCEPTUAL_EPSILON: f32 = 0.001;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Long-run hop bookkeeping may be off by at most one sample.
pub const HOP_DRIFT_SAMPLES: f64 = 1.0;
