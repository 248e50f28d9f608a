//! Whole-buffer rendering.

use lento_core::{Frames, Planar, PlanarMut};

use crate::config::WsolaConfig;
use crate::engine::WsolaEngine;
use crate::Result;

/// Time-scale a complete signal at a constant `time_scale`.
///
/// The last partial request is zero-padded and the engine is drained, so
/// the result holds roughly `input.frames() / time_scale` frames. Extra
/// input channels beyond `config.channels` are ignored.
///
/// ```
/// use lento_stretch::{stretch, WsolaConfig};
///
/// let input = vec![vec![0.25_f32; 1000]];
/// let output = stretch(WsolaConfig::new(1).window_size(64), 0.5, &input)?;
/// assert!(output.len() > 1800);
/// # Ok::<(), lento_stretch::Error>(())
/// ```
pub fn stretch<B: Planar + ?Sized>(
    config: WsolaConfig,
    time_scale: f32,
    input: &B,
) -> Result<Frames> {
    let mut engine = WsolaEngine::new(config)?;
    let channels = engine.channels();
    if input.channel_count() < channels {
        return Err(lento_core::Error::RowOutOfRange {
            row: channels - 1,
            rows: input.channel_count(),
        }
        .into());
    }

    let total = input.frames();
    let estimate = (total as f64 / f64::from(time_scale.max(engine.max_time_scale().recip())))
        .ceil() as usize;
    let mut rendered: Vec<Vec<f32>> = (0..channels)
        .map(|_| Vec::with_capacity(estimate + engine.max_input_samples_required()))
        .collect();
    let mut staging = Frames::new(channels, engine.max_input_samples_required());
    let mut position = 0;
    let mut blocks = 0usize;

    while position < total {
        let needed = engine.samples_required();
        let available = needed.min(total - position);
        for ch in 0..channels {
            let row = staging.channel_mut(ch);
            row[..available].copy_from_slice(&input.channel(ch)[position..position + available]);
            row[available..needed].fill(0.0);
        }
        position += available;

        engine.process(time_scale, &staging)?;
        append_output(&engine, &mut rendered);
        blocks += 1;
    }

    let silence: [&[f32]; 0] = [];
    while engine.no_more_audio() > 0 {
        engine.process(time_scale, &silence[..])?;
        append_output(&engine, &mut rendered);
        blocks += 1;
    }

    tracing::debug!(
        input_frames = total,
        output_frames = rendered.first().map_or(0, Vec::len),
        blocks,
        "Offline stretch complete"
    );

    Ok(Frames::from_planar(&rendered))
}

fn append_output(engine: &WsolaEngine, rendered: &mut [Vec<f32>]) {
    for (ch, row) in rendered.iter_mut().enumerate() {
        row.extend_from_slice(engine.output().channel(ch));
    }
}
