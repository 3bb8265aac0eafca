//! Error types for zipflate operations.
//!
//! Every failure in the codec is terminal for the call that raised it.
//! Decoders never hand back partially decoded output together with an
//! error; callers decide whether to retry with different input.

use std::io;
use thiserror::Error;

/// The main error type for zipflate operations.
#[derive(Debug, Error)]
pub enum ZipflateError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A bit or byte cursor would move past the end of its buffer.
    #[error("Out of range: position {position} exceeds buffer limit {limit}")]
    OutOfRange {
        /// Byte position that was requested.
        position: usize,
        /// Length of the underlying buffer.
        limit: usize,
    },

    /// The compressed data is malformed.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// The input ended before the final block was seen.
    #[error("Truncated input at offset {offset}: no final block")]
    Truncated {
        /// Byte offset at which the input ran out.
        offset: u64,
    },

    /// The caller passed something the format cannot represent.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },
}

/// Result type alias for zipflate operations.
pub type Result<T> = std::result::Result<T, ZipflateError>;

impl ZipflateError {
    /// Create an out-of-range error.
    pub fn out_of_range(position: usize, limit: usize) -> Self {
        Self::OutOfRange { position, limit }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptData {
            offset,
            message: message.into(),
        }
    }

    /// Create a truncated input error.
    pub fn truncated(offset: u64) -> Self {
        Self::Truncated { offset }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error means the stream ran out rather than being wrong.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
