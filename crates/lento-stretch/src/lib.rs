//! Pitch-preserving time-scale modification using WSOLA.
//!
//! - [`WsolaEngine`] - block-based streaming engine with a fixed output block
//! - [`StreamStretcher`] - ring-buffered front end for arbitrary host block sizes
//! - [`stretch`] - render a complete signal in one call
//!
//! ```
//! use lento_stretch::{WsolaConfig, WsolaEngine};
//!
//! let mut engine = WsolaEngine::new(WsolaConfig::new(2).sample_rate(44100.0))?;
//! let block = vec![vec![0.0_f32; engine.samples_required()]; 2];
//! engine.process(1.25, &block)?;
//! assert_eq!(engine.output().len(), engine.output_size());
//! # Ok::<(), lento_stretch::Error>(())
//! ```

mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{
    SearchResolution, WsolaConfig, DEFAULT_SAMPLE_RATE, DEFAULT_SEARCH_DEPTH,
    DEFAULT_WINDOW_DURATION,
};

mod similarity;
pub use similarity::SimilaritySearch;

mod engine;
pub use engine::{WsolaEngine, MIN_TIME_SCALE};

mod stream;
pub use stream::StreamStretcher;

mod offline;
pub use offline::stretch;

pub use lento_core::{Frames, OlaWindow, Planar, PlanarMut};
