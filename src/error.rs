//! Centralized error type for the lento umbrella crate.
//!
//! Wraps the member crate errors so `?` propagates across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] lento_core::Error),

    #[error(transparent)]
    Stretch(#[from] lento_stretch::Error),
}

impl Error {
    /// Whether the error is a recoverable out-of-bounds access, wherever it
    /// was raised.
    pub fn is_range(&self) -> bool {
        match self {
            Error::Core(_) => true,
            Error::Stretch(err) => err.is_range(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
