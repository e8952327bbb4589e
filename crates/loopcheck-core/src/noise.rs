//! Distortion injection: DC offset, gain clipping, pops, dropouts, and Gaussian noise.
//!
//! Every function reads a [`SampleBuffer`] and returns a fresh interleaved
//! sample array of the same length. The input is never modified; install the
//! result with [`SampleBuffer::apply`] or
//! [`SampleBuffer::apply_with`].
//!
//! Arithmetic is promoted (`f64` or `i64`), clamped to the buffer's
//! amplitude range, and only then truncated back to the sample type. The
//! clamp-then-truncate order is what turns overflow into saturation instead
//! of wraparound.

use core::f64::consts::PI;

use rand::Rng;

use crate::buffer::SampleBuffer;
use crate::error::{Error, Result};

/// Default burst length, in frames, for [`pop_noise`] and [`cut_noise`].
pub const DEFAULT_NOISE_DURATION_SAMPLES: usize = 5;

/// Channels hit by a pop or cut when none are named.
pub const DEFAULT_NOISE_CHANNELS: [usize; 1] = [0];

/// Add a constant offset to every sample.
pub fn dc_offset(buffer: &SampleBuffer, offset: f64) -> Result<Vec<i32>> {
    check_finite("offset", offset)?;
    let width = buffer.width();
    Ok(buffer
        .samples()
        .iter()
        .map(|&s| width.saturate(s as f64 + offset))
        .collect())
}

/// Multiply every sample by `gain`.
///
/// Gains that push samples past full scale produce hard clipping through
/// the saturating clamp.
pub fn clipping(buffer: &SampleBuffer, gain: f64) -> Result<Vec<i32>> {
    check_finite("gain", gain)?;
    let width = buffer.width();
    Ok(buffer
        .samples()
        .iter()
        .map(|&s| width.saturate(s as f64 * gain))
        .collect())
}

/// Add an impulsive glitch on selected channels.
///
/// Starting at frame `round(at_seconds * sample_rate)`, `level` is added to
/// each of the next `duration_samples` frames of every listed channel. A
/// `level` of `None` uses the format's full scale. A burst that would run past
/// the last frame is cut short.
pub fn pop_noise(
    buffer: &SampleBuffer,
    at_seconds: f64,
    channels: &[usize],
    level: Option<i64>,
    duration_samples: usize,
) -> Result<Vec<i32>> {
    check_channels(buffer, channels)?;
    let start = target_frame(buffer, at_seconds)?;
    let level = level.unwrap_or(buffer.max_amplitude() as i64);
    let width = buffer.width();
    let stride = buffer.channels();
    let end = start.saturating_add(duration_samples).min(buffer.frames());

    let mut out = buffer.samples().to_vec();
    for &ch in channels {
        for frame in start..end {
            let idx = frame * stride + ch;
            out[idx] = width.saturate_int((out[idx] as i64).saturating_add(level));
        }
    }
    Ok(out)
}

/// Splice out a short segment on selected channels.
///
/// From frame `round(at_seconds * sample_rate)` onward, every frame of each
/// listed channel is replaced by the frame `duration_samples` later, closing
/// the gap. The vacated tail is zero-filled. Channels not listed are left
/// untouched, so they end up leading the cut channels by `duration_samples`.
pub fn cut_noise(
    buffer: &SampleBuffer,
    at_seconds: f64,
    channels: &[usize],
    duration_samples: usize,
) -> Result<Vec<i32>> {
    check_channels(buffer, channels)?;
    let start = target_frame(buffer, at_seconds)?;
    let stride = buffer.channels();
    let frames = buffer.frames();
    let tail = frames.saturating_sub(duration_samples).max(start);

    let mut out = buffer.samples().to_vec();
    for &ch in channels {
        for frame in start..tail {
            out[frame * stride + ch] = out[(frame + duration_samples) * stride + ch];
        }
        for frame in tail..frames {
            out[frame * stride + ch] = 0;
        }
    }
    Ok(out)
}

/// Add independent zero-mean Gaussian noise with standard deviation `std_dev`.
///
/// Draws come from `rng` via the Box-Muller transform, so a seeded
/// generator gives reproducible output.
pub fn gaussian_noise<R: Rng + ?Sized>(
    buffer: &SampleBuffer,
    std_dev: f64,
    rng: &mut R,
) -> Result<Vec<i32>> {
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(Error::invalid(format!(
            "noise standard deviation must be non-negative, got {std_dev}"
        )));
    }
    let width = buffer.width();
    let mut normals = GaussianSource::default();
    Ok(buffer
        .samples()
        .iter()
        .map(|&s| width.saturate(s as f64 + std_dev * normals.next(rng)))
        .collect())
}

/// Alias of [`gaussian_noise`].
pub fn normalized_noise<R: Rng + ?Sized>(
    buffer: &SampleBuffer,
    std_dev: f64,
    rng: &mut R,
) -> Result<Vec<i32>> {
    gaussian_noise(buffer, std_dev, rng)
}

/// Standard normal draws, two per uniform pair (Box-Muller).
#[derive(Debug, Default)]
struct GaussianSource {
    spare: Option<f64>,
}

impl GaussianSource {
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // u1 in (0, 1] keeps ln() finite
        let u1: f64 = 1.0 - rng.r#gen::<f64>();
        let u2: f64 = rng.r#gen::<f64>();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        self.spare = Some(radius * theta.sin());
        radius * theta.cos()
    }
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(format!("{name} must be finite, got {value}")))
    }
}

fn check_channels(buffer: &SampleBuffer, channels: &[usize]) -> Result<()> {
    match channels.iter().find(|&&ch| ch >= buffer.channels()) {
        Some(ch) => Err(Error::invalid(format!(
            "channel {ch} out of range for {} channels",
            buffer.channels()
        ))),
        None => Ok(()),
    }
}

fn target_frame(buffer: &SampleBuffer, at_seconds: f64) -> Result<usize> {
    if !at_seconds.is_finite() || at_seconds < 0.0 {
        return Err(Error::invalid(format!(
            "target time must be non-negative, got {at_seconds}"
        )));
    }
    let frame = (at_seconds * buffer.sample_rate() as f64).round() as usize;
    if frame >= buffer.frames() {
        return Err(Error::invalid(format!(
            "target time {at_seconds}s is past the end of the buffer ({:.6}s)",
            buffer.duration_seconds()
        )));
    }
    Ok(frame)
}
