//! Error types for lento-core.

use thiserror::Error;

/// Out-of-bounds access into a multi-channel buffer.
///
/// Always recoverable: the buffer that reported it is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Row {row} out of range: buffer has {rows} channel rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Column {col} out of range: buffer has {cols} sample columns")]
    ColumnOutOfRange { col: usize, cols: usize },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
