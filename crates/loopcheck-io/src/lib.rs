//! WAV I/O for loopcheck sample buffers.
//!
//! This crate provides:
//!
//! - [`read_wav`] and [`write_wav`]: lossless integer PCM load/save of a
//!   [`SampleBuffer`](loopcheck_core::SampleBuffer) at 8, 16, 24, or 32 bits
//! - [`read_wav_info`]: header metadata without decoding samples
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use loopcheck_io::{read_wav, write_wav};
//!
//! let capture = read_wav("test_audio/output.wav")?;
//! write_wav("result/copy.wav", &capture)?;
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file's sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Decoded samples do not form a valid buffer.
    #[error("Invalid audio buffer: {0}")]
    Buffer(#[from] loopcheck_core::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
