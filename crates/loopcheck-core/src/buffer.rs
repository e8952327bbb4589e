//! Interleaved integer sample buffer with format metadata.
//!
//! [`SampleBuffer`] is the data model every other loopcheck component works
//! on: generators produce it, transforms rewrite its samples, the evaluator
//! reads it, and the WAV layer serializes it.
//!
//! Samples are stored as `i32` regardless of width. The [`SampleWidth`]
//! decides the representable range, which is symmetric and keeps one LSB of
//! headroom:
//!
//! ```text
//! [-(2^(8w-1) - 1), 2^(8w-1) - 1]
//! ```

use crate::error::{Error, Result};
use crate::generator::SignalGenerator;
use crate::transform::{BufferTransform, Transform};

/// Bytes per sample of an integer PCM format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    /// 8-bit samples.
    Int8,
    /// 16-bit samples.
    Int16,
    /// 24-bit samples.
    Int24,
    /// 32-bit samples.
    Int32,
}

impl SampleWidth {
    /// Look up a width from its byte count (1, 2, 3 or 4).
    pub fn from_bytes(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(SampleWidth::Int8),
            2 => Ok(SampleWidth::Int16),
            3 => Ok(SampleWidth::Int24),
            4 => Ok(SampleWidth::Int32),
            other => Err(Error::invalid(format!(
                "sample width must be 1, 2, 3 or 4 bytes, got {other}"
            ))),
        }
    }

    /// Bytes per sample.
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::Int8 => 1,
            SampleWidth::Int16 => 2,
            SampleWidth::Int24 => 3,
            SampleWidth::Int32 => 4,
        }
    }

    /// Bits per sample.
    pub fn bits(self) -> u16 {
        (self.bytes() * 8) as u16
    }

    /// Largest representable amplitude, `2^(bits-1) - 1`.
    pub fn max_amplitude(self) -> i32 {
        ((1i64 << (self.bits() - 1)) - 1) as i32
    }

    /// Smallest representable amplitude, the negation of [`max_amplitude`](Self::max_amplitude).
    pub fn min_amplitude(self) -> i32 {
        -self.max_amplitude()
    }

    /// Clamp a real value into range, then truncate toward zero.
    ///
    /// Clamping happens before the integer conversion so out-of-range values
    /// saturate instead of wrapping. NaN maps to 0.
    #[inline]
    pub fn saturate(self, value: f64) -> i32 {
        value.clamp(self.min_amplitude() as f64, self.max_amplitude() as f64) as i32
    }

    /// Clamp a wide integer into range.
    #[inline]
    pub fn saturate_int(self, value: i64) -> i32 {
        value.clamp(self.min_amplitude() as i64, self.max_amplitude() as i64) as i32
    }
}

/// Interleaved multi-channel integer audio with format metadata.
///
/// Layout is frame-major: `[f0c0, f0c1, f1c0, f1c1, ...]`. The sample count
/// is always a multiple of the channel count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i32>,
    sample_rate: u32,
    width: SampleWidth,
    channels: usize,
}

impl SampleBuffer {
    /// Wrap already-decoded interleaved samples.
    ///
    /// Fails if the sample rate or channel count is zero, or if the sample
    /// count is not a whole number of frames.
    pub fn new(
        samples: Vec<i32>,
        sample_rate: u32,
        width: SampleWidth,
        channels: usize,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::invalid("sample rate must be positive"));
        }
        if channels == 0 {
            return Err(Error::invalid("channel count must be positive"));
        }
        if samples.len() % channels != 0 {
            return Err(Error::invalid(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            width,
            channels,
        })
    }

    /// Generate a single sine tone on every channel.
    ///
    /// See [`SignalGenerator::sine`].
    pub fn from_sine(
        duration: f64,
        freq: f64,
        amplitude: Option<f64>,
        sample_rate: u32,
        width: SampleWidth,
        channels: usize,
    ) -> Result<Self> {
        SignalGenerator::new(sample_rate, width, channels)?.sine(duration, freq, amplitude)
    }

    /// Generate an averaged mix of sine tones on every channel.
    ///
    /// See [`SignalGenerator::multi_sine`].
    pub fn from_multi_sine(
        duration: f64,
        freqs: &[f64],
        amplitude: Option<f64>,
        sample_rate: u32,
        width: SampleWidth,
        channels: usize,
    ) -> Result<Self> {
        SignalGenerator::new(sample_rate, width, channels)?.multi_sine(duration, freqs, amplitude)
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Consume the buffer, returning the interleaved samples.
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    /// Sample rate in frames per second.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sample width.
    pub fn width(&self) -> SampleWidth {
        self.width
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Total number of interleaved samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest representable amplitude for this buffer's width.
    pub fn max_amplitude(&self) -> i32 {
        self.width.max_amplitude()
    }

    /// Smallest representable amplitude for this buffer's width.
    pub fn min_amplitude(&self) -> i32 {
        self.width.min_amplitude()
    }

    /// Largest sample value currently stored, or `None` when empty.
    pub fn max_value(&self) -> Option<i32> {
        self.samples.iter().copied().max()
    }

    /// Smallest sample value currently stored, or `None` when empty.
    pub fn min_value(&self) -> Option<i32> {
        self.samples.iter().copied().min()
    }

    /// De-interleave one channel.
    pub fn channel(&self, index: usize) -> Result<Vec<i32>> {
        if index >= self.channels {
            return Err(Error::invalid(format!(
                "channel {index} out of range for {} channels",
                self.channels
            )));
        }
        Ok(self
            .samples
            .iter()
            .skip(index)
            .step_by(self.channels)
            .copied()
            .collect())
    }

    /// Deep copy. Equivalent to `clone()`.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Average this buffer with another, sample by sample.
    ///
    /// The sum is taken in 64-bit arithmetic, floor-divided by two, and
    /// clamped to the amplitude range. Both buffers must share sample rate,
    /// channel count, width, and length.
    pub fn mix(&self, other: &SampleBuffer) -> Result<SampleBuffer> {
        self.check_compatible(other)?;
        if self.width != other.width {
            return Err(Error::incompatible(format!(
                "sample width {} vs {} bytes",
                self.width.bytes(),
                other.width.bytes()
            )));
        }
        if self.samples.len() != other.samples.len() {
            return Err(Error::incompatible(format!(
                "length {} vs {} samples",
                self.samples.len(),
                other.samples.len()
            )));
        }

        let width = self.width;
        let samples = self
            .samples
            .iter()
            .zip(other.samples.iter())
            .map(|(&a, &b)| width.saturate_int((a as i64 + b as i64).div_euclid(2)))
            .collect();

        Ok(Self {
            samples,
            sample_rate: self.sample_rate,
            width,
            channels: self.channels,
        })
    }

    /// Fail with [`Error::IncompatibleFormat`] unless sample rate and channel count match.
    pub fn check_compatible(&self, other: &SampleBuffer) -> Result<()> {
        if self.sample_rate != other.sample_rate {
            return Err(Error::incompatible(format!(
                "sample rate {} vs {} Hz",
                self.sample_rate, other.sample_rate
            )));
        }
        if self.channels != other.channels {
            return Err(Error::incompatible(format!(
                "{} vs {} channels",
                self.channels, other.channels
            )));
        }
        Ok(())
    }

    /// Run one of the built-in transforms and replace the samples with its output.
    pub fn apply(&mut self, transform: &Transform) -> Result<&mut Self> {
        self.apply_with(transform)
    }

    /// Run any [`BufferTransform`] and replace the samples with its output.
    ///
    /// The buffer is untouched if the transform fails or returns an array of
    /// a different length.
    pub fn apply_with<T: BufferTransform + ?Sized>(&mut self, transform: &T) -> Result<&mut Self> {
        let samples = transform.transform(self)?;
        if samples.len() != self.samples.len() {
            return Err(Error::incompatible(format!(
                "transform '{}' returned {} samples, expected {}",
                transform.name(),
                samples.len(),
                self.samples.len()
            )));
        }
        self.samples = samples;
        Ok(self)
    }
}
