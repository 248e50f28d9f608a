//! # Lento - Streaming Time-Scale Modification
//!
//! Change the playback speed of multi-channel audio without changing its
//! pitch, one fixed-size block at a time.
//!
//! ## Architecture
//!
//! Lento is an umbrella crate that re-exports:
//! - **lento-core** - Sample matrix (`Frames`), planar block traits, overlap-add window
//! - **lento-stretch** - WSOLA engine, ring-buffered stream adapter, offline rendering
//!
//! ## Quick Start
//!
//! ```
//! use lento::prelude::*;
//!
//! let mut engine = WsolaEngine::new(WsolaConfig::new(2).sample_rate(44100.0))?;
//! let block = vec![vec![0.0_f32; engine.max_input_samples_required()]; 2];
//!
//! // Play 25% faster
//! let needed = engine.samples_required();
//! let left = &block[0][..needed];
//! let right = &block[1][..needed];
//! engine.process(1.25, &[left, right])?;
//!
//! // At end of stream, flush what is still buffered
//! let silence: [&[f32]; 0] = [];
//! while engine.no_more_audio() > 0 {
//!     engine.process(1.25, &silence)?;
//! }
//! # Ok::<(), lento::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serialization` - serde derives on `WsolaConfig` and `SearchResolution`

/// Re-export of lento-core for direct access
pub use lento_core as core;

/// Re-export of lento-stretch for direct access
pub use lento_stretch as stretch;

pub use lento_core::{Frames, OlaWindow, Planar, PlanarMut};

pub use lento_stretch::{
    SearchResolution, SimilaritySearch, StreamStretcher, WsolaConfig, WsolaEngine,
    DEFAULT_SAMPLE_RATE, DEFAULT_SEARCH_DEPTH, DEFAULT_WINDOW_DURATION, MIN_TIME_SCALE,
};

mod error;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    // Engine
    pub use crate::{SearchResolution, WsolaConfig, WsolaEngine};

    // Buffers
    pub use crate::{Frames, Planar, PlanarMut};

    // Streaming and offline helpers
    pub use crate::stretch::{stretch, StreamStretcher};
}
