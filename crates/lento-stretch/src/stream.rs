//! FIFO adapter between host block sizes and the engine's hop contract.
//!
//! Hosts deliver and request audio in whatever block size they like; the
//! engine wants exactly `samples_required()` samples in and gives exactly
//! `output_size()` samples out. `StreamStretcher` queues both sides in
//! per-channel ring buffers and runs the engine whenever a full request is
//! queued and there is room for its output.

use lento_core::{Frames, Planar, PlanarMut};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::config::WsolaConfig;
use crate::engine::WsolaEngine;
use crate::{Error, Result};

/// Queued, block-size agnostic front end for [`WsolaEngine`].
///
/// ```
/// use lento_stretch::{StreamStretcher, WsolaConfig};
///
/// let mut stretcher = StreamStretcher::new(WsolaConfig::new(1).window_size(64), 1024)?;
/// stretcher.push_input(&[vec![0.0_f32; 256]])?;
/// let produced = stretcher.process(1.0);
/// assert_eq!(produced, stretcher.output_available());
///
/// let mut out = vec![vec![0.0_f32; produced]];
/// assert_eq!(stretcher.pop_output(&mut out)?, produced);
/// # Ok::<(), lento_stretch::Error>(())
/// ```
pub struct StreamStretcher {
    engine: WsolaEngine,
    input_producers: Vec<HeapProd<f32>>,
    input_consumers: Vec<HeapCons<f32>>,
    output_producers: Vec<HeapProd<f32>>,
    output_consumers: Vec<HeapCons<f32>>,
    staging: Frames,
    capacity: usize,
    drain_remaining: Option<isize>,
}

impl StreamStretcher {
    /// `capacity` is the per-channel size of each FIFO, in frames.
    pub fn new(config: WsolaConfig, capacity: usize) -> Result<Self> {
        let engine = WsolaEngine::new(config)?;
        let required = engine
            .max_input_samples_required()
            .max(engine.output_size());
        if capacity < required {
            return Err(Error::InvalidCapacity { capacity, required });
        }

        let channels = engine.channels();
        let (input_producers, input_consumers): (Vec<_>, Vec<_>) = (0..channels)
            .map(|_| HeapRb::<f32>::new(capacity).split())
            .unzip();
        let (output_producers, output_consumers): (Vec<_>, Vec<_>) = (0..channels)
            .map(|_| HeapRb::<f32>::new(capacity).split())
            .unzip();

        tracing::debug!(channels, capacity, "Created stream stretcher");

        Ok(Self {
            staging: Frames::new(channels, engine.max_input_samples_required()),
            engine,
            input_producers,
            input_consumers,
            output_producers,
            output_consumers,
            capacity,
            drain_remaining: None,
        })
    }

    #[inline]
    pub fn engine(&self) -> &WsolaEngine {
        &self.engine
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.engine.channels()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames queued for the engine.
    pub fn input_available(&self) -> usize {
        self.input_consumers
            .iter()
            .map(|c| c.occupied_len())
            .min()
            .unwrap_or(0)
    }

    /// Frames ready to be popped.
    pub fn output_available(&self) -> usize {
        self.output_consumers
            .iter()
            .map(|c| c.occupied_len())
            .min()
            .unwrap_or(0)
    }

    fn input_vacant(&self) -> usize {
        self.input_producers
            .iter()
            .map(|p| p.vacant_len())
            .min()
            .unwrap_or(0)
    }

    fn output_vacant(&self) -> usize {
        self.output_producers
            .iter()
            .map(|p| p.vacant_len())
            .min()
            .unwrap_or(0)
    }

    /// Whether `finish` has flushed everything into the output FIFOs.
    pub fn is_finished(&self) -> bool {
        matches!(self.drain_remaining, Some(remaining) if remaining <= 0)
    }

    /// Queue input frames. Returns how many frames were accepted, which is
    /// less than offered when the FIFOs are full. Input is ignored once
    /// [`finish`](Self::finish) has started draining.
    pub fn push_input<B: Planar + ?Sized>(&mut self, block: &B) -> Result<usize> {
        self.check_channels(block.channel_count())?;
        if self.engine.is_draining() {
            return Ok(0);
        }

        let frames = block.frames().min(self.input_vacant());
        for (ch, producer) in self.input_producers.iter_mut().enumerate() {
            producer.push_slice(&block.channel(ch)[..frames]);
        }
        Ok(frames)
    }

    /// Pop up to `block.frames()` output frames. Returns the count popped.
    pub fn pop_output<B: PlanarMut + ?Sized>(&mut self, block: &mut B) -> Result<usize> {
        self.check_channels(block.channel_count())?;

        let frames = block.frames().min(self.output_available());
        for (ch, consumer) in self.output_consumers.iter_mut().enumerate() {
            consumer.pop_slice(&mut block.channel_mut(ch)[..frames]);
        }
        Ok(frames)
    }

    /// Run the engine over every full request currently queued, as long as
    /// the output FIFOs have room. Returns output frames produced.
    pub fn process(&mut self, time_scale: f32) -> usize {
        let hop = self.engine.output_size();
        let mut produced = 0;

        while !self.engine.is_draining() {
            let needed = self.engine.samples_required();
            if self.input_available() < needed || self.output_vacant() < hop {
                break;
            }

            for (ch, consumer) in self.input_consumers.iter_mut().enumerate() {
                consumer.pop_slice(&mut self.staging.channel_mut(ch)[..needed]);
            }
            if !self.run_engine(time_scale) {
                break;
            }
            produced += hop;
        }

        produced
    }

    /// Flush everything: process queued input, zero-pad a trailing partial
    /// request, then drain the engine.
    ///
    /// Stops early when the output FIFOs fill up; pop output and call again
    /// until [`is_finished`](Self::is_finished). Returns output frames
    /// produced by this call.
    pub fn finish(&mut self, time_scale: f32) -> usize {
        let hop = self.engine.output_size();
        let mut produced = self.process(time_scale);

        if !self.engine.is_draining() {
            let needed = self.engine.samples_required();
            let queued = self.input_available();
            if queued >= needed || self.output_vacant() < hop {
                return produced;
            }

            if queued > 0 {
                for (ch, consumer) in self.input_consumers.iter_mut().enumerate() {
                    let row = self.staging.channel_mut(ch);
                    consumer.pop_slice(&mut row[..queued]);
                    row[queued..needed].fill(0.0);
                }
                if self.run_engine(time_scale) {
                    produced += hop;
                }
            }
        }

        loop {
            let remaining = match self.drain_remaining.take() {
                Some(remaining) => remaining,
                None => {
                    // Drained blocks carry no new audio
                    if !self.engine.is_draining() {
                        self.staging.fill(0.0);
                    }
                    self.engine.no_more_audio()
                }
            };
            if remaining <= 0 || self.output_vacant() < hop {
                self.drain_remaining = Some(remaining);
                break;
            }
            if !self.run_engine(time_scale) {
                break;
            }
            produced += hop;
        }

        produced
    }

    /// Clear all queues and restart the engine.
    pub fn reset(&mut self) -> Result<()> {
        self.engine.reset(self.engine.channels())?;
        for consumer in self
            .input_consumers
            .iter_mut()
            .chain(self.output_consumers.iter_mut())
        {
            let queued = consumer.occupied_len();
            consumer.skip(queued);
        }
        self.drain_remaining = None;
        Ok(())
    }

    fn check_channels(&self, count: usize) -> Result<()> {
        let channels = self.channels();
        if count < channels {
            return Err(lento_core::Error::RowOutOfRange {
                row: channels - 1,
                rows: count,
            }
            .into());
        }
        Ok(())
    }

    /// Feed the staging block to the engine and queue its output.
    fn run_engine(&mut self, time_scale: f32) -> bool {
        if let Err(err) = self.engine.process(time_scale, &self.staging) {
            tracing::warn!("Stream stretcher dropped a block: {}", err);
            return false;
        }
        for (ch, producer) in self.output_producers.iter_mut().enumerate() {
            producer.push_slice(self.engine.output().channel(ch));
        }
        true
    }
}
