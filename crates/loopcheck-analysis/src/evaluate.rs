//! Per-channel alignment and similarity evaluation.
//!
//! [`AlignmentEvaluator`] compares an original buffer with a recorded one
//! channel by channel:
//!
//! 1. Both channels are normalized: mean removed, the original divided by
//!    `std · len` and the recorded by `std` (population std), so the
//!    correlation peak of identical signals is 1.
//! 2. The full cross-correlation is computed and the first maximum gives the
//!    lag, `lag = argmax - (len(recorded) - 1)`.
//! 3. The raw signals are aligned by that lag and cut to a common length.
//! 4. Mean squared error and average spectral coherence are measured on
//!    the aligned overlap.
//!
//! A positive lag means the original lags the recorded signal.
//!
//! # Example
//!
//! ```rust
//! use loopcheck_analysis::AlignmentEvaluator;
//! use loopcheck_core::{SampleWidth, SignalGenerator};
//!
//! let generator = SignalGenerator::new(8000, SampleWidth::Int16, 1).unwrap();
//! let original = generator.sine(0.5, 440.0, None).unwrap();
//! let recorded = original.copy();
//!
//! let report = AlignmentEvaluator::new().evaluate(&original, &recorded).unwrap();
//! assert_eq!(report.channels[0].lag_samples, 0);
//! ```

use loopcheck_core::{Error, Result, SampleBuffer};
use serde::{Deserialize, Serialize};

use crate::compare::{align_and_truncate, mse};
use crate::spectrum::{DEFAULT_SEGMENT_LEN, average_coherence};
use crate::xcorr::{index_to_lag, peak, xcorr_full};

/// Similarity metrics for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Channel index.
    pub channel: usize,
    /// Lag in samples; positive when the original lags.
    pub lag_samples: i64,
    /// Lag in seconds.
    pub lag_seconds: f64,
    /// Maximum of the normalized cross-correlation.
    pub peak_correlation: f64,
    /// Mean squared error of the aligned overlap, in squared sample units.
    pub mean_squared_error: f64,
    /// Magnitude-squared coherence averaged over frequency bins, in `[0, 1]`.
    pub average_spectral_coherence: f64,
    /// Length of the aligned overlap in samples.
    pub overlap_samples: usize,
}

/// Results for every channel, ordered by channel index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Sample rate shared by both buffers.
    pub sample_rate: u32,
    /// One entry per channel.
    pub channels: Vec<AlignmentResult>,
}

impl EvaluationReport {
    /// Result for `channel`, if present.
    pub fn channel(&self, channel: usize) -> Option<&AlignmentResult> {
        self.channels.iter().find(|r| r.channel == channel)
    }
}

/// Hooks called while an evaluation runs.
///
/// Both methods default to doing nothing.
pub trait EvaluationObserver {
    /// Called once the lag of `channel` is known.
    fn alignment_found(&mut self, channel: usize, lag_samples: i64, peak_correlation: f64) {
        let _ = (channel, lag_samples, peak_correlation);
    }

    /// Called once all metrics of a channel are computed.
    fn metrics_computed(&mut self, result: &AlignmentResult) {
        let _ = result;
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EvaluationObserver for NoopObserver {}

/// Observer that reports progress as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EvaluationObserver for TracingObserver {
    fn alignment_found(&mut self, channel: usize, lag_samples: i64, peak_correlation: f64) {
        tracing::debug!(channel, lag_samples, peak_correlation, "alignment found");
    }

    fn metrics_computed(&mut self, result: &AlignmentResult) {
        tracing::info!(
            channel = result.channel,
            lag_samples = result.lag_samples,
            lag_seconds = result.lag_seconds,
            peak_correlation = result.peak_correlation,
            mse = result.mean_squared_error,
            coherence = result.average_spectral_coherence,
            "channel evaluated"
        );
    }
}

/// Compares original and recorded buffers channel by channel.
#[derive(Debug, Clone)]
pub struct AlignmentEvaluator<O = NoopObserver> {
    max_segment_len: usize,
    observer: O,
}

impl AlignmentEvaluator<NoopObserver> {
    /// Evaluator with the default coherence segment length and no observer.
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl Default for AlignmentEvaluator<NoopObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: EvaluationObserver> AlignmentEvaluator<O> {
    /// Evaluator reporting to `observer`.
    pub fn with_observer(observer: O) -> Self {
        Self {
            max_segment_len: DEFAULT_SEGMENT_LEN,
            observer,
        }
    }

    /// Set the upper bound on the coherence segment length.
    pub fn with_max_segment_len(mut self, max_segment_len: usize) -> Result<Self> {
        if max_segment_len == 0 {
            return Err(Error::invalid("coherence segment length must be positive"));
        }
        self.max_segment_len = max_segment_len;
        Ok(self)
    }

    /// Upper bound on the coherence segment length.
    pub fn max_segment_len(&self) -> usize {
        self.max_segment_len
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Consume the evaluator and return its observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Evaluate every channel of `recorded` against `original`.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelMismatch`] if the channel counts differ and
    /// [`Error::IncompatibleFormat`] if the sample rates differ.
    pub fn evaluate(
        &mut self,
        original: &SampleBuffer,
        recorded: &SampleBuffer,
    ) -> Result<EvaluationReport> {
        if original.channels() != recorded.channels() {
            return Err(Error::ChannelMismatch {
                original: original.channels(),
                recorded: recorded.channels(),
            });
        }
        if original.sample_rate() != recorded.sample_rate() {
            return Err(Error::incompatible(format!(
                "sample rates differ: original {} Hz, recorded {} Hz",
                original.sample_rate(),
                recorded.sample_rate()
            )));
        }

        let sample_rate = original.sample_rate();
        let channels = (0..original.channels())
            .map(|ch| {
                let orig = to_f64(&original.channel(ch)?);
                let rec = to_f64(&recorded.channel(ch)?);
                Ok(self.evaluate_channel(ch, &orig, &rec, sample_rate))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EvaluationReport {
            sample_rate,
            channels,
        })
    }

    /// Evaluate one pair of de-interleaved channels.
    pub fn evaluate_channel(
        &mut self,
        channel: usize,
        original: &[f64],
        recorded: &[f64],
        sample_rate: u32,
    ) -> AlignmentResult {
        let (lag, peak_correlation) = find_lag(original, recorded);
        self.observer.alignment_found(channel, lag, peak_correlation);

        let (aligned_orig, aligned_rec) = align_and_truncate(original, recorded, lag);
        let result = AlignmentResult {
            channel,
            lag_samples: lag,
            lag_seconds: lag as f64 / f64::from(sample_rate),
            peak_correlation,
            mean_squared_error: mse(aligned_orig, aligned_rec),
            average_spectral_coherence: average_coherence(
                aligned_orig,
                aligned_rec,
                self.max_segment_len,
            ),
            overlap_samples: aligned_orig.len(),
        };
        self.observer.metrics_computed(&result);
        result
    }
}

/// Lag and peak of the normalized cross-correlation.
///
/// Empty or constant input has no defined normalization and yields `(0, 0.0)`.
pub fn find_lag(original: &[f64], recorded: &[f64]) -> (i64, f64) {
    let (Some(orig_norm), Some(rec_norm)) = (
        standardize(original, original.len() as f64),
        standardize(recorded, 1.0),
    ) else {
        return (0, 0.0);
    };

    let correlation = xcorr_full(&orig_norm, &rec_norm);
    match peak(&correlation) {
        Some((index, value)) => (index_to_lag(index, recorded.len()), value),
        None => (0, 0.0),
    }
}

/// `(x - mean) / (std · extra_scale)`, or `None` if the std is zero or undefined.
fn standardize(signal: &[f64], extra_scale: f64) -> Option<Vec<f64>> {
    if signal.is_empty() {
        return None;
    }
    let n = signal.len() as f64;
    let mean = signal.iter().sum::<f64>() / n;
    let std = (signal.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
    if !std.is_normal() {
        return None;
    }
    let denom = std * extra_scale;
    Some(signal.iter().map(|x| (x - mean) / denom).collect())
}

fn to_f64(samples: &[i32]) -> Vec<f64> {
    samples.iter().map(|&s| f64::from(s)).collect()
}
