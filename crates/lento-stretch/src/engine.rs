//! Streaming WSOLA time-scale engine
//!
//! Speeds up or slows down multi-channel audio without changing its pitch.
//! Output is produced in fixed blocks of `N/2` samples; only the rate at which
//! input is consumed follows the time scale.
//!
//! ## Algorithm Overview
//!
//! 1. **Buffering**: the oldest columns of the sample buffer are dropped and
//!    the caller's new samples appended at the end.
//! 2. **Similarity search**: candidate segments near the start of the buffer
//!    are compared against the natural continuation of the previous segment;
//!    the closest one is chosen. The grid of candidates passes through the
//!    position where that continuation now sits, and ties go to it.
//! 3. **Overlap-add**: the falling half of the previous segment is cross-faded
//!    with the rising half of the chosen one.
//! 4. **Hop bookkeeping**: the next request is `round(time_scale * N/2 + rem)`,
//!    with the fractional remainder carried to the next call.
//!
//! ## RT-Safety
//!
//! All buffers are sized in [`WsolaEngine::new`] and [`WsolaEngine::reset`].
//! [`WsolaEngine::process`] performs no allocations and does not log.

use lento_core::{Frames, OlaWindow, Planar, PlanarMut};

use crate::config::WsolaConfig;
use crate::similarity::SimilaritySearch;
use crate::{Error, Result};

/// Smallest accepted time scale. Smaller (or non-positive) values are clamped.
pub const MIN_TIME_SCALE: f32 = 0.01;

/// Waveform Similarity Overlap-Add engine.
///
/// Caller contract:
///
/// 1. size staging buffers with [`max_input_samples_required`](Self::max_input_samples_required),
/// 2. pass exactly [`samples_required`](Self::samples_required) new samples per
///    channel to every [`process`](Self::process) call,
/// 3. read [`output_size`](Self::output_size) samples per channel from
///    [`output`](Self::output) after each call,
/// 4. at end of stream, call [`no_more_audio`](Self::no_more_audio) and keep
///    processing (with no new samples) while it returns a positive value.
///
/// ```
/// use lento_stretch::{WsolaConfig, WsolaEngine};
///
/// let mut engine = WsolaEngine::new(WsolaConfig::new(1).window_size(8))?;
/// assert_eq!(engine.samples_required(), 20);
///
/// let block = vec![vec![0.0_f32; 20]];
/// let next = engine.process(0.5, &block)?;
/// assert_eq!(next, 2);
/// assert_eq!(engine.output().len(), 4);
/// # Ok::<(), lento_stretch::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct WsolaEngine {
    config: WsolaConfig,

    // Geometry
    window_size: usize,
    hop: usize,
    search_depth: usize,
    search_step: usize,

    // Pre-allocated buffers
    window: OlaWindow,
    buffer: Frames,
    target: Frames,
    search: SimilaritySearch,
    input: Frames,
    output: Frames,

    // Streaming state
    input_hop: usize,
    rem: f64,
    last_offset: usize,
    last_time_scale: f32,
    primed: bool,
    drain_remaining: Option<isize>,
}

impl WsolaEngine {
    pub fn new(config: WsolaConfig) -> Result<Self> {
        let window_size = config.resolved_window_size()?;
        let hop = window_size / 2;
        let channels = config.channels;
        let search_depth = config.search_depth;
        let buffer_len = config.max_input_samples()?;

        tracing::debug!(
            channels,
            window_size,
            hop,
            search_depth,
            resolution = ?config.resolution,
            "Created WSOLA engine"
        );

        Ok(Self {
            window_size,
            hop,
            search_depth,
            search_step: config.resolution.step(hop),
            window: OlaWindow::hann(window_size),
            buffer: Frames::new(channels, buffer_len),
            target: Frames::new(channels, window_size),
            search: SimilaritySearch::new(window_size),
            input: Frames::new(channels, buffer_len),
            output: Frames::new(channels, hop),
            input_hop: buffer_len,
            rem: 0.0,
            last_offset: 0,
            last_time_scale: 1.0,
            primed: false,
            drain_remaining: None,
            config,
        })
    }

    /// Engine with default settings for `channels` channels.
    pub fn with_channels(channels: usize) -> Result<Self> {
        Self::new(WsolaConfig::new(channels))
    }

    /// Return to the start state for `channels` channels.
    ///
    /// Keeping the channel count reuses the existing buffers; changing it
    /// reallocates. On error the engine is left as it was.
    pub fn reset(&mut self, channels: usize) -> Result<()> {
        if channels == self.channels() {
            self.buffer.fill(0.0);
            self.target.fill(0.0);
            self.input.fill(0.0);
            self.output.fill(0.0);
            self.input_hop = self.max_input_samples_required();
            self.rem = 0.0;
            self.last_offset = 0;
            self.last_time_scale = 1.0;
            self.primed = false;
            self.drain_remaining = None;
        } else {
            *self = Self::new(self.config.clone().channels(channels))?;
        }

        tracing::debug!(channels, "Reset WSOLA engine");
        Ok(())
    }

    /// Change the sample rate, re-deriving the window size.
    ///
    /// Restarts the engine. With an explicit window size only the stored
    /// rate changes.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        let engine = Self::new(self.config.clone().sample_rate(sample_rate))?;
        tracing::debug!(
            sample_rate,
            window_size = engine.window_size,
            "Changed WSOLA sample rate"
        );
        *self = engine;
        Ok(())
    }

    #[inline]
    pub fn config(&self) -> &WsolaConfig {
        &self.config
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.config.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Window length `N`.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    #[inline]
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }

    /// Samples per channel produced by every `process` call (`N/2`).
    #[inline]
    pub fn output_size(&self) -> usize {
        self.hop
    }

    /// New samples per channel the next `process` call must receive.
    /// Zero once draining.
    #[inline]
    pub fn samples_required(&self) -> usize {
        if self.drain_remaining.is_some() {
            0
        } else {
            self.input_hop
        }
    }

    /// Upper bound of [`samples_required`](Self::samples_required).
    #[inline]
    pub fn max_input_samples_required(&self) -> usize {
        self.buffer.len()
    }

    /// Largest time scale the buffer can follow.
    #[inline]
    pub fn max_time_scale(&self) -> f32 {
        (self.search_depth + 2) as f32
    }

    /// Fractional part of the ideal hop not yet consumed.
    #[inline]
    pub fn remainder(&self) -> f64 {
        self.rem
    }

    /// Offset chosen by the most recent similarity search.
    #[inline]
    pub fn last_offset(&self) -> usize {
        self.last_offset
    }

    #[inline]
    pub fn is_draining(&self) -> bool {
        self.drain_remaining.is_some()
    }

    /// Output of the most recent `process` call, one row per channel.
    #[inline]
    pub fn output(&self) -> &Frames {
        &self.output
    }

    /// Staging input used by [`process_loaded`](Self::process_loaded).
    #[inline]
    pub fn input(&self) -> &Frames {
        &self.input
    }

    #[inline]
    pub fn input_mut(&mut self) -> &mut Frames {
        &mut self.input
    }

    /// Consume `samples_required()` new samples per channel from `input` and
    /// produce the next `output_size()` samples per channel.
    ///
    /// `time_scale` > 1 plays faster, < 1 slower. It is clamped to
    /// `[MIN_TIME_SCALE, max_time_scale()]`; non-finite values count as 1.0.
    ///
    /// Returns the number of samples per channel required by the next call.
    /// A block with too few channels or samples is rejected with a range error
    /// before any state changes. While draining, missing samples are treated
    /// as silence.
    pub fn process<B: Planar + ?Sized>(&mut self, time_scale: f32, input: &B) -> Result<usize> {
        let channels = self.channels();
        let needed = self.input_hop;

        if self.drain_remaining.is_none() {
            if input.channel_count() < channels {
                return Err(lento_core::Error::RowOutOfRange {
                    row: channels - 1,
                    rows: input.channel_count(),
                }
                .into());
            }
            let shortest = (0..channels)
                .map(|ch| input.channel(ch).len())
                .find(|&len| len < needed);
            if let Some(short) = shortest {
                return Err(lento_core::Error::ColumnOutOfRange {
                    col: needed - 1,
                    cols: short,
                }
                .into());
            }
        }

        self.ingest(input, needed);
        self.synthesize(needed);
        self.advance(time_scale);

        Ok(self.samples_required())
    }

    /// [`process`](Self::process) over the staging input filled through
    /// [`load_input`](Self::load_input) or [`input_mut`](Self::input_mut).
    pub fn process_loaded(&mut self, time_scale: f32) -> Result<usize> {
        let input = std::mem::take(&mut self.input);
        let result = self.process(time_scale, &input);
        self.input = input;
        result
    }

    /// Write one staging input sample.
    pub fn load_input(&mut self, channel: usize, index: usize, value: f32) -> Result<()> {
        Ok(self.input.set(channel, index, value)?)
    }

    /// Read one sample of the latest output block.
    pub fn unload_output(&self, channel: usize, index: usize) -> Result<f32> {
        Ok(self.output.get(channel, index)?)
    }

    /// Signal end of stream.
    ///
    /// The first call switches to draining and returns the number of output
    /// samples still buffered; each further call subtracts one output block.
    /// Keep calling `process` (no new samples needed) while this returns a
    /// positive value.
    pub fn no_more_audio(&mut self) -> isize {
        let remaining = match self.drain_remaining {
            Some(remaining) => remaining - self.hop as isize,
            None => {
                let pending = self.pending_output() as isize;
                tracing::debug!(pending, "Draining WSOLA engine");
                pending
            }
        };
        self.drain_remaining = Some(remaining);
        remaining
    }

    /// Output samples per channel still owed for the input already consumed,
    /// estimated at the most recent time scale.
    ///
    /// The whole buffer is pending, less the block that the first call spent
    /// fading in from silence.
    pub fn pending_output(&self) -> usize {
        if !self.primed {
            return 0;
        }
        let buffered = (self.buffer.len() as f64 / self.last_time_scale as f64).round() as usize;
        buffered.saturating_sub(self.hop)
    }

    fn ingest<B: Planar + ?Sized>(&mut self, input: &B, count: usize) {
        self.buffer.shift_left(count);
        let start = self.buffer.len() - count;
        let channels = self.buffer.channels().min(input.channel_count());

        for ch in 0..channels {
            let src = input.channel(ch);
            let n = src.len().min(count);
            self.buffer.channel_mut(ch)[start..start + n].copy_from_slice(&src[..n]);
        }
    }

    fn synthesize(&mut self, consumed: usize) {
        let hop = self.hop;

        // Nothing has been emitted yet, so there is nothing to align with
        let offset = if self.primed {
            let last = (self.search_depth - 1) * hop;
            // Where the target's samples sit after the shift
            let anchor = (self.last_offset + hop).saturating_sub(consumed);
            self.search.best_offset(
                &self.buffer,
                &self.target,
                &self.window,
                anchor,
                last,
                self.search_step,
            )
        } else {
            0
        };
        self.primed = true;
        self.last_offset = offset;

        let fade_in = self.window.fade_in();
        let fade_out = self.window.fade_out();

        for ch in 0..self.output.channels() {
            let source = self.buffer.channel(ch);
            let segment = &source[offset..offset + hop];
            let tail = &self.target.channel(ch)[..hop];

            for ((((out, &t), &s), &fo), &fi) in self
                .output
                .channel_mut(ch)
                .iter_mut()
                .zip(tail)
                .zip(segment)
                .zip(fade_out)
                .zip(fade_in)
            {
                *out = t * fo + s * fi;
            }

            // What the next block should look like if no realignment is needed
            let next = &source[offset + hop..offset + hop + self.window_size];
            self.target.channel_mut(ch).copy_from_slice(next);
        }
    }

    fn advance(&mut self, time_scale: f32) {
        let time_scale = if time_scale.is_finite() {
            time_scale.clamp(MIN_TIME_SCALE, self.max_time_scale())
        } else {
            1.0
        };
        self.last_time_scale = time_scale;

        let shift_on = time_scale as f64 * self.hop as f64 + self.rem;
        let required =
            (shift_on.round().max(0.0) as usize).min(self.max_input_samples_required());
        self.rem = shift_on - required as f64;
        self.input_hop = required;
    }
}
