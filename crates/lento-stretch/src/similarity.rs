//! Waveform similarity search.
//!
//! Every candidate segment is weighted by the overlap-add window and compared
//! against the predicted continuation of the previous output. The distance is
//! the Euclidean norm of the difference, summed over all channels, so one
//! alignment is chosen for the whole multi-channel frame.

use lento_core::{Frames, OlaWindow, Planar};

/// Reusable search state. Holds one channel's windowed candidate at a time.
#[derive(Debug, Clone)]
pub struct SimilaritySearch {
    scratch: Vec<f32>,
}

impl SimilaritySearch {
    pub fn new(window_size: usize) -> Self {
        Self {
            scratch: vec![0.0; window_size],
        }
    }

    /// Windowed distance between `target` and the `buffer` segment that starts
    /// at `offset`.
    ///
    /// `target` holds one window length per channel; `buffer` must have the
    /// same channel count and at least `offset + window.len()` columns.
    pub fn distance(
        &mut self,
        buffer: &Frames,
        target: &Frames,
        window: &OlaWindow,
        offset: usize,
    ) -> f32 {
        let n = window.len();
        let coeffs = window.as_slice();
        let mut energy = 0.0_f32;

        for ch in 0..target.channels() {
            let candidate = &buffer.channel(ch)[offset..offset + n];
            for ((s, &x), &w) in self.scratch.iter_mut().zip(candidate).zip(coeffs) {
                *s = x * w;
            }

            energy += target
                .channel(ch)
                .iter()
                .zip(coeffs)
                .zip(&self.scratch)
                .map(|((&t, &w), &c)| {
                    let d = t * w - c;
                    d * d
                })
                .sum::<f32>();
        }

        energy.sqrt()
    }

    /// Offset in `0..=last` with the smallest distance.
    ///
    /// `anchor` is the natural continuation of the previous segment. It is
    /// measured first and wins every tie; the remaining candidates lie on the
    /// grid of `step` samples that passes through it.
    pub fn best_offset(
        &mut self,
        buffer: &Frames,
        target: &Frames,
        window: &OlaWindow,
        anchor: usize,
        last: usize,
        step: usize,
    ) -> usize {
        let anchor = anchor.min(last);
        let step = step.max(1);
        let mut best = anchor;
        let mut best_distance = self.distance(buffer, target, window, anchor);

        for offset in (anchor % step..=last).step_by(step) {
            if offset == anchor {
                continue;
            }
            let distance = self.distance(buffer, target, window, offset);
            // NaN compares false and never replaces a finite best
            if distance < best_distance || best_distance.is_nan() {
                best = offset;
                best_distance = distance;
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lento_core::PlanarMut;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| (i as f32 * 0.37).sin()).collect()
    }

    #[test]
    fn test_identical_segment_has_zero_distance() {
        let window = OlaWindow::hann(8);
        let signal = ramp(20);
        let buffer = Frames::from_planar(&[&signal[..]]);
        let target = Frames::from_planar(&[&signal[6..14]]);

        let mut search = SimilaritySearch::new(8);
        assert_eq!(search.distance(&buffer, &target, &window, 6), 0.0);
        assert!(search.distance(&buffer, &target, &window, 5) > 0.0);
    }

    #[test]
    fn test_finds_exact_match() {
        let window = OlaWindow::hann(8);
        let signal = ramp(20);
        let buffer = Frames::from_planar(&[&signal[..]]);
        let target = Frames::from_planar(&[&signal[9..17]]);

        let mut search = SimilaritySearch::new(8);
        assert_eq!(search.best_offset(&buffer, &target, &window, 0, 12, 1), 9);
        // Coarse grid cannot reach 9
        let coarse = search.best_offset(&buffer, &target, &window, 0, 12, 4);
        assert_eq!(coarse % 4, 0);
    }

    #[test]
    fn test_ties_prefer_anchor() {
        let window = OlaWindow::hann(8);
        let buffer = Frames::new(1, 20);
        let target = Frames::new(1, 8);

        let mut search = SimilaritySearch::new(8);
        assert_eq!(search.best_offset(&buffer, &target, &window, 0, 12, 4), 0);
        assert_eq!(search.best_offset(&buffer, &target, &window, 0, 12, 1), 0);
        assert_eq!(search.best_offset(&buffer, &target, &window, 6, 12, 4), 6);
        assert_eq!(search.best_offset(&buffer, &target, &window, 7, 12, 1), 7);
    }

    #[test]
    fn test_anchor_clamped_to_last() {
        let window = OlaWindow::hann(8);
        let buffer = Frames::new(1, 20);
        let target = Frames::new(1, 8);

        let mut search = SimilaritySearch::new(8);
        assert_eq!(search.best_offset(&buffer, &target, &window, 40, 12, 4), 12);
    }

    #[test]
    fn test_grid_runs_through_anchor() {
        let window = OlaWindow::hann(8);
        let signal = ramp(24);
        let buffer = Frames::from_planar(&[&signal[..]]);
        let target = Frames::from_planar(&[&signal[7..15]]);

        let mut search = SimilaritySearch::new(8);
        // Grid 3, 7, 11 from anchor 3 contains the exact match
        assert_eq!(search.best_offset(&buffer, &target, &window, 3, 12, 4), 7);
        // Grid 0, 4, 8, 12 does not
        assert_ne!(search.best_offset(&buffer, &target, &window, 0, 12, 4), 7);
    }

    #[test]
    fn test_window_masks_edge_sample() {
        // w[0] == 0, so a difference only in the first sample is invisible
        let window = OlaWindow::hann(8);
        let mut buffer = Frames::new(1, 8);
        buffer.channel_mut(0)[0] = 1.0;
        let target = Frames::new(1, 8);

        let mut search = SimilaritySearch::new(8);
        assert_abs_diff_eq!(
            search.distance(&buffer, &target, &window, 0),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_channels_are_summed() {
        let window = OlaWindow::hann(4);
        // Peak of the window sits at index 2
        let buffer = Frames::from_planar(&[[0.0_f32, 0.0, 3.0, 0.0], [0.0, 0.0, 4.0, 0.0]]);
        let target = Frames::new(2, 4);

        let mut search = SimilaritySearch::new(4);
        assert_abs_diff_eq!(
            search.distance(&buffer, &target, &window, 0),
            5.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_nan_candidates_never_win() {
        let window = OlaWindow::hann(4);
        let buffer = Frames::from_planar(&[[f32::NAN, f32::NAN, f32::NAN, f32::NAN, 0.0, 0.0, 0.0, 0.0]]);
        let target = Frames::new(1, 4);

        let mut search = SimilaritySearch::new(4);
        assert_eq!(search.best_offset(&buffer, &target, &window, 0, 4, 4), 4);
        assert_eq!(search.best_offset(&buffer, &target, &window, 4, 4, 4), 4);
    }
}
