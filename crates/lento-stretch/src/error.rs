//! Error types.

use thiserror::Error;

/// Error type.
///
/// Configuration variants are raised while building an engine and leave no
/// engine behind. `Range` is recoverable: the engine that reported it keeps
/// its state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Overlap-add needs an even window.
    #[error("Window size must be divisible by 2, got {0}")]
    OddWindowSize(usize),

    #[error("Window size {0} too small (minimum 2)")]
    WindowTooSmall(usize),

    #[error("Channel count must be at least 1")]
    NoChannels,

    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    #[error("Invalid window duration: {0} s")]
    InvalidWindowDuration(f64),

    /// Power-of-two padding does not fit in `usize`.
    #[error("Window size {0} too large to pad to a power of two")]
    WindowTooLarge(usize),

    #[error("Sample buffer too large: {channels} channels x {hop} hop x (search depth {search_depth} + 2)")]
    BufferTooLarge {
        channels: usize,
        hop: usize,
        search_depth: usize,
    },

    #[error("Search depth must be at least 1")]
    ZeroSearchDepth,

    #[error("FIFO capacity {capacity} too small (need at least {required} frames)")]
    InvalidCapacity { capacity: usize, required: usize },

    /// Out-of-bounds element or block access.
    #[error("Range error: {0}")]
    Range(#[from] lento_core::Error),
}

impl Error {
    /// Whether this error came from invalid construction parameters.
    pub fn is_configuration(&self) -> bool {
        !self.is_range()
    }

    /// Whether this error is a recoverable out-of-bounds access.
    pub fn is_range(&self) -> bool {
        matches!(self, Error::Range(_))
    }
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
