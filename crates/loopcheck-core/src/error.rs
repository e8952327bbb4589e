//! Error types shared by buffer operations, generators, transforms, and evaluation.

use thiserror::Error;

/// Errors raised by loopcheck buffer and signal operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two buffers disagree on format (sample rate, channel count, width, or length).
    #[error("incompatible format: {0}")]
    IncompatibleFormat(String),

    /// Buffers handed to the evaluator carry different channel counts.
    #[error("channel mismatch: original has {original} channels, recorded has {recorded}")]
    ChannelMismatch {
        /// Channel count of the original buffer.
        original: usize,
        /// Channel count of the recorded buffer.
        recorded: usize,
    },

    /// A parameter is outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidArgument(reason.into())
    }

    /// Create an incompatible format error.
    pub fn incompatible(reason: impl Into<String>) -> Self {
        Error::IncompatibleFormat(reason.into())
    }
}

/// Convenience result type for loopcheck operations.
pub type Result<T> = std::result::Result<T, Error>;
