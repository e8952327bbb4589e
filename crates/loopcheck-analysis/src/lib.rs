//! Loopcheck Analysis - Alignment and similarity metrics for recorded audio
//!
//! This crate measures how closely a recorded signal matches its original:
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`xcorr`] - Full linear cross-correlation and peak-lag detection
//! - [`spectrum`] - Welch PSD, cross spectral density, and coherence
//! - [`compare`] - Mean squared error and lag alignment
//! - [`evaluate`] - Per-channel [`AlignmentEvaluator`] and its report
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use loopcheck_analysis::{AlignmentEvaluator, TracingObserver};
//!
//! // 1. Generate and save the original (loopcheck-core, loopcheck-io)
//! // 2. Play it through the device under test and capture the result
//! // 3. Compare
//! let mut evaluator = AlignmentEvaluator::with_observer(TracingObserver);
//! let report = evaluator.evaluate(&original, &recorded)?;
//! for ch in &report.channels {
//!     println!("ch{} lag {} coherence {:.3}", ch.channel, ch.lag_samples, ch.average_spectral_coherence);
//! }
//! ```

pub mod compare;
pub mod evaluate;
pub mod fft;
pub mod spectrum;
pub mod xcorr;

pub use evaluate::{
    AlignmentEvaluator, AlignmentResult, EvaluationObserver, EvaluationReport, NoopObserver,
    TracingObserver, find_lag,
};
pub use spectrum::DEFAULT_SEGMENT_LEN;
