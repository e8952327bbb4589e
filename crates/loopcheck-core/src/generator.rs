//! Deterministic test-signal synthesis.
//!
//! [`SignalGenerator`] fixes an output format (rate, width, channels) and
//! produces [`SampleBuffer`]s holding sine tones. Every channel carries the
//! same mono signal.
//!
//! Time samples follow a half-open grid: `n = floor(rate * duration)` points
//! evenly spaced over `[0, duration)`, i.e. `t[i] = i * duration / n`.

use core::f64::consts::PI;

use crate::buffer::{SampleBuffer, SampleWidth};
use crate::error::{Error, Result};

/// Share of full scale used when no amplitude is given.
pub const DEFAULT_HEADROOM: f64 = 0.9;

/// Sine tone generator for a fixed output format.
///
/// # Example
///
/// ```rust
/// use loopcheck_core::{SampleWidth, SignalGenerator};
///
/// let generator = SignalGenerator::new(48000, SampleWidth::Int16, 2).unwrap();
/// let tone = generator.sine(0.5, 1000.0, None).unwrap();
/// assert_eq!(tone.frames(), 24000);
/// assert_eq!(tone.channels(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalGenerator {
    sample_rate: u32,
    width: SampleWidth,
    channels: usize,
}

impl SignalGenerator {
    /// Create a generator for the given output format.
    pub fn new(sample_rate: u32, width: SampleWidth, channels: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::invalid("sample rate must be positive"));
        }
        if channels == 0 {
            return Err(Error::invalid("channel count must be positive"));
        }
        Ok(Self {
            sample_rate,
            width,
            channels,
        })
    }

    /// Output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output sample width.
    pub fn width(&self) -> SampleWidth {
        self.width
    }

    /// Output channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Generate `amplitude * sin(2π·freq·t)`.
    ///
    /// `amplitude` of `None`, or any negative value, selects 90% of the
    /// format's full scale. Samples are truncated toward zero after clamping
    /// to the representable range.
    pub fn sine(&self, duration: f64, freq: f64, amplitude: Option<f64>) -> Result<SampleBuffer> {
        let amplitude = self.resolve_amplitude(amplitude)?;
        let times = self.time_grid(duration)?;
        check_frequency(freq)?;

        let width = self.width;
        let mono: Vec<i32> = times
            .iter()
            .map(|&t| width.saturate(amplitude * (2.0 * PI * freq * t).sin()))
            .collect();

        self.replicate(&mono)
    }

    /// Generate the average of several sine tones.
    ///
    /// Each tone is quantized on its own exactly as [`sine`](Self::sine)
    /// would, the tones are summed in 64-bit arithmetic, and the sum is
    /// floor-divided by the number of tones. The result can therefore never
    /// exceed the per-tone amplitude.
    pub fn multi_sine(
        &self,
        duration: f64,
        freqs: &[f64],
        amplitude: Option<f64>,
    ) -> Result<SampleBuffer> {
        if freqs.is_empty() {
            return Err(Error::invalid("frequency list must not be empty"));
        }
        let amplitude = self.resolve_amplitude(amplitude)?;
        let times = self.time_grid(duration)?;
        for &freq in freqs {
            check_frequency(freq)?;
        }

        let width = self.width;
        let mut acc = vec![0i64; times.len()];
        for &freq in freqs {
            for (sum, &t) in acc.iter_mut().zip(times.iter()) {
                *sum += width.saturate(amplitude * (2.0 * PI * freq * t).sin()) as i64;
            }
        }

        let count = freqs.len() as i64;
        let mono: Vec<i32> = acc
            .into_iter()
            .map(|sum| width.saturate_int(sum.div_euclid(count)))
            .collect();

        self.replicate(&mono)
    }

    fn resolve_amplitude(&self, amplitude: Option<f64>) -> Result<f64> {
        match amplitude {
            Some(a) if a.is_nan() => Err(Error::invalid("amplitude must not be NaN")),
            Some(a) if a >= 0.0 => Ok(a),
            _ => Ok(self.width.max_amplitude() as f64 * DEFAULT_HEADROOM),
        }
    }

    fn time_grid(&self, duration: f64) -> Result<Vec<f64>> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::invalid(format!(
                "duration must be positive, got {duration}"
            )));
        }
        let n = (self.sample_rate as f64 * duration).floor() as usize;
        let step = if n > 0 { duration / n as f64 } else { 0.0 };
        Ok((0..n).map(|i| i as f64 * step).collect())
    }

    fn replicate(&self, mono: &[i32]) -> Result<SampleBuffer> {
        let samples: Vec<i32> = mono
            .iter()
            .flat_map(|&s| std::iter::repeat_n(s, self.channels))
            .collect();
        SampleBuffer::new(samples, self.sample_rate, self.width, self.channels)
    }
}

fn check_frequency(freq: f64) -> Result<()> {
    if freq.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(format!("frequency must be finite, got {freq}")))
    }
}
