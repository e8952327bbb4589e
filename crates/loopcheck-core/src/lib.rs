//! Loopcheck Core - Sample buffers, test signals, and distortions
//!
//! This crate holds the offline building blocks for verifying an audio
//! path:
//!
//! - [`buffer`] - Interleaved integer [`SampleBuffer`] and its [`SampleWidth`]
//! - [`generator`] - Sine and multi-tone synthesis
//! - [`noise`] - DC offset, clipping, pops, cuts, and Gaussian noise
//! - [`filter`] - 4th-order Butterworth low/high/band-pass/band-stop filters
//! - [`biquad`] - Direct Form I second-order section
//! - [`transform`] - [`Transform`] enum and the [`BufferTransform`] trait
//!
//! All processing works on whole buffers. Integer arithmetic is promoted,
//! clamped to the sample range, and then truncated, so overflow always
//! saturates.
//!
//! ## Example
//!
//! ```rust
//! use loopcheck_core::{FilterKind, SampleWidth, SignalGenerator, Transform};
//!
//! let generator = SignalGenerator::new(48000, SampleWidth::Int16, 2).unwrap();
//! let original = generator.sine(1.0, 1000.0, None).unwrap();
//!
//! let mut recorded = original.copy();
//! recorded
//!     .apply(&Transform::DcOffset { offset: 200.0 }).unwrap()
//!     .apply(&Transform::Filter(FilterKind::LowPass { cutoff: 4000.0 })).unwrap();
//!
//! assert_eq!(recorded.len(), original.len());
//! ```

pub mod biquad;
pub mod buffer;
pub mod error;
pub mod filter;
pub mod generator;
pub mod noise;
pub mod transform;

pub use biquad::Biquad;
pub use buffer::{SampleBuffer, SampleWidth};
pub use error::{Error, Result};
pub use filter::{
    BUTTERWORTH_ORDER, ButterworthDesign, FilterKind, PassType, SecondOrderSection,
    band_pass_filter, band_stop_filter, pass_filter,
};
pub use generator::{DEFAULT_HEADROOM, SignalGenerator};
pub use noise::{DEFAULT_NOISE_CHANNELS, DEFAULT_NOISE_DURATION_SAMPLES};
pub use transform::{BufferTransform, Transform};
