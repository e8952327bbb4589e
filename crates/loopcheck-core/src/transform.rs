//! Buffer transforms: the closed set of built-in distortions plus an open trait.
//!
//! [`Transform`] names every distortion the toolkit ships with and is what
//! scenarios and the CLI build. Anything else that rewrites a buffer can
//! implement [`BufferTransform`] and go through
//! [`SampleBuffer::apply_with`].

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::buffer::SampleBuffer;
use crate::error::Result;
use crate::filter::{self, FilterKind};
use crate::noise;

/// Something that maps a buffer to a new interleaved sample array.
///
/// Implementations must return exactly `buffer.len()` samples; the buffer
/// rejects anything else.
pub trait BufferTransform {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Compute the transformed samples without touching `buffer`.
    fn transform(&self, buffer: &SampleBuffer) -> Result<Vec<i32>>;
}

/// Built-in distortions.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Add a constant to every sample.
    DcOffset {
        /// Offset in sample units.
        offset: f64,
    },
    /// Scale every sample and saturate.
    Clipping {
        /// Linear gain.
        gain: f64,
    },
    /// Add a short burst on selected channels.
    PopNoise {
        /// Burst start in seconds.
        at_seconds: f64,
        /// Affected channel indices.
        channels: Vec<usize>,
        /// Burst level; full scale when `None`.
        level: Option<i64>,
        /// Burst length in frames.
        duration_samples: usize,
    },
    /// Splice out a short segment on selected channels.
    CutNoise {
        /// Cut position in seconds.
        at_seconds: f64,
        /// Affected channel indices.
        channels: Vec<usize>,
        /// Frames removed.
        duration_samples: usize,
    },
    /// Additive Gaussian noise.
    GaussianNoise {
        /// Standard deviation in sample units.
        std_dev: f64,
        /// Seed for reproducible noise; OS entropy when `None`.
        seed: Option<u64>,
    },
    /// 4th-order Butterworth filter.
    Filter(FilterKind),
}

impl BufferTransform for Transform {
    fn name(&self) -> &str {
        match self {
            Transform::DcOffset { .. } => "dc_offset",
            Transform::Clipping { .. } => "clipping",
            Transform::PopNoise { .. } => "pop_noise",
            Transform::CutNoise { .. } => "cut_noise",
            Transform::GaussianNoise { .. } => "gaussian_noise",
            Transform::Filter(kind) => kind.label(),
        }
    }

    fn transform(&self, buffer: &SampleBuffer) -> Result<Vec<i32>> {
        match self {
            Transform::DcOffset { offset } => noise::dc_offset(buffer, *offset),
            Transform::Clipping { gain } => noise::clipping(buffer, *gain),
            Transform::PopNoise {
                at_seconds,
                channels,
                level,
                duration_samples,
            } => noise::pop_noise(buffer, *at_seconds, channels, *level, *duration_samples),
            Transform::CutNoise {
                at_seconds,
                channels,
                duration_samples,
            } => noise::cut_noise(buffer, *at_seconds, channels, *duration_samples),
            Transform::GaussianNoise { std_dev, seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                noise::gaussian_noise(buffer, *std_dev, &mut rng)
            }
            Transform::Filter(kind) => filter::filter(buffer, *kind),
        }
    }
}
