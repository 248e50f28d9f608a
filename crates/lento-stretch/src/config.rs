//! WSOLA engine configuration.

use crate::{Error, Result};

/// Sample rate assumed when none is given (Hz).
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Overlap-add window length in seconds.
pub const DEFAULT_WINDOW_DURATION: f64 = 0.02;

/// Number of hop-spaced candidate positions searched per output block.
pub const DEFAULT_SEARCH_DEPTH: usize = 3;

/// Spacing of the candidate offsets tried by the similarity search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SearchResolution {
    /// Candidates are one hop (N/2 samples) apart: `search_depth` candidates.
    #[default]
    Hop,

    /// Every sample offset across the same search region.
    /// Finds better splice points, costs roughly `N/2` times more.
    Sample,
}

impl SearchResolution {
    /// Distance in samples between neighbouring candidates.
    #[inline]
    pub fn step(&self, hop: usize) -> usize {
        match self {
            SearchResolution::Hop => hop.max(1),
            SearchResolution::Sample => 1,
        }
    }
}

/// Construction parameters for [`WsolaEngine`](crate::WsolaEngine).
///
/// The window size `N` is derived as `round(sample_rate * window_duration)`
/// unless given explicitly. It must be even; half of it is both the output
/// block size and the nominal input hop.
///
/// ```
/// use lento_stretch::{SearchResolution, WsolaConfig};
///
/// let config = WsolaConfig::new(2)
///     .sample_rate(44100.0)
///     .resolution(SearchResolution::Sample);
/// assert_eq!(config.resolved_window_size().unwrap(), 882);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WsolaConfig {
    pub channels: usize,
    pub sample_rate: f64,
    /// Seconds. Ignored when `window_size` is set.
    pub window_duration: f64,
    pub search_depth: usize,
    pub resolution: SearchResolution,
    /// Explicit window size in samples.
    pub window_size: Option<usize>,
    /// Round the output block size up to a power of two.
    pub pow2_output: bool,
}

impl WsolaConfig {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            ..Self::default()
        }
    }

    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn window_duration(mut self, seconds: f64) -> Self {
        self.window_duration = seconds;
        self
    }

    pub fn search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn resolution(mut self, resolution: SearchResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn window_size(mut self, samples: usize) -> Self {
        self.window_size = Some(samples);
        self
    }

    pub fn pow2_output(mut self, enabled: bool) -> Self {
        self.pow2_output = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.max_input_samples().map(|_| ())
    }

    /// Effective window size `N`, after power-of-two padding.
    pub fn resolved_window_size(&self) -> Result<usize> {
        if self.channels == 0 {
            return Err(Error::NoChannels);
        }
        if self.search_depth == 0 {
            return Err(Error::ZeroSearchDepth);
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }

        let size = match self.window_size {
            Some(size) => size,
            None => {
                if !self.window_duration.is_finite() || self.window_duration <= 0.0 {
                    return Err(Error::InvalidWindowDuration(self.window_duration));
                }
                (self.sample_rate * self.window_duration).round() as usize
            }
        };

        if size < 2 {
            return Err(Error::WindowTooSmall(size));
        }
        if size % 2 != 0 {
            return Err(Error::OddWindowSize(size));
        }

        if self.pow2_output {
            (size / 2)
                .checked_next_power_of_two()
                .and_then(|half| half.checked_mul(2))
                .ok_or(Error::WindowTooLarge(size))
        } else {
            Ok(size)
        }
    }

    /// Output block size and nominal hop (`N/2`).
    pub fn hop_size(&self) -> Result<usize> {
        Ok(self.resolved_window_size()? / 2)
    }

    /// Largest number of input samples a single call may request.
    ///
    /// This is also the per-channel length of the engine's sample buffer, so
    /// it fails when the whole buffer would not be addressable.
    pub fn max_input_samples(&self) -> Result<usize> {
        let hop = self.hop_size()?;
        let too_large = Error::BufferTooLarge {
            channels: self.channels,
            hop,
            search_depth: self.search_depth,
        };
        let len = self
            .search_depth
            .checked_add(2)
            .and_then(|blocks| blocks.checked_mul(hop))
            .ok_or_else(|| too_large.clone())?;
        match len.checked_mul(self.channels) {
            Some(_) => Ok(len),
            None => Err(too_large),
        }
    }
}

impl Default for WsolaConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: DEFAULT_SAMPLE_RATE,
            window_duration: DEFAULT_WINDOW_DURATION,
            search_depth: DEFAULT_SEARCH_DEPTH,
            resolution: SearchResolution::default(),
            window_size: None,
            pow2_output: false,
        }
    }
}
