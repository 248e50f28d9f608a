//! Overlap-add cross-fade window.

use std::f32::consts::PI;

/// Periodic Hann window used for 50% overlap-add.
///
/// Rises monotonically from 0 at the edge to 1 at the centre and satisfies
/// `w[i] + w[i + N/2] == 1`, so a fade-out of one segment and the fade-in of
/// the next always sum to unity gain.
#[derive(Debug, Clone, PartialEq)]
pub struct OlaWindow {
    coeffs: Vec<f32>,
}

impl OlaWindow {
    /// Hann window of length `size`. `size` should be even.
    pub fn hann(size: usize) -> Self {
        let coeffs = (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
            .collect();
        Self { coeffs }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[inline]
    pub fn half(&self) -> usize {
        self.coeffs.len() / 2
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.coeffs
    }

    /// Rising half (gain applied to the incoming segment).
    #[inline]
    pub fn fade_in(&self) -> &[f32] {
        &self.coeffs[..self.half()]
    }

    /// Falling half (gain applied to the outgoing segment).
    #[inline]
    pub fn fade_out(&self) -> &[f32] {
        &self.coeffs[self.half()..]
    }
}
