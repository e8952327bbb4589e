//! Welch spectral estimates and magnitude-squared coherence.
//!
//! Every estimate splits the input into segments of `segment_len` samples
//! with 50% overlap, removes each segment's mean, applies a periodic Hann
//! window, and averages one-sided spectra over segments. Segments start at
//! `0, hop, 2·hop, …` while `start + segment_len <= len`; a trailing partial
//! segment is dropped.
//!
//! Spectral densities are scaled by `1 / (fs · Σw²)` and doubled on every bin
//! except DC and, for even lengths, Nyquist.

use crate::fft::{Fft, hann_window};
use rustfft::num_complex::Complex64;

/// Default upper bound on the Welch segment length.
pub const DEFAULT_SEGMENT_LEN: usize = 2048;

/// One-sided spectrum: bin frequencies in Hz and one value per bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum<T> {
    /// Bin centre frequencies, `k · fs / segment_len`.
    pub frequencies: Vec<f64>,
    /// Value per bin.
    pub values: Vec<T>,
}

impl<T> Spectrum<T> {
    fn empty() -> Self {
        Self {
            frequencies: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Welch power spectral density of `x`.
///
/// `segment_len` is capped at `x.len()`. Empty input or a zero segment length
/// gives an empty spectrum.
pub fn welch_psd(x: &[f64], sample_rate: f64, segment_len: usize) -> Spectrum<f64> {
    let csd = cross_spectral_density(x, x, sample_rate, segment_len);
    Spectrum {
        frequencies: csd.frequencies,
        values: csd.values.iter().map(|c| c.re).collect(),
    }
}

/// Welch cross spectral density `Pxy = E[X · conj(Y)]`.
///
/// Only the first `min(x.len(), y.len())` samples of each input take part.
pub fn cross_spectral_density(
    x: &[f64],
    y: &[f64],
    sample_rate: f64,
    segment_len: usize,
) -> Spectrum<Complex64> {
    let len = x.len().min(y.len());
    if len == 0 || segment_len == 0 {
        return Spectrum::empty();
    }
    let segment_len = segment_len.min(len);
    let starts = segment_starts(len, segment_len, segment_len / 2);
    let window = hann_window(segment_len);
    let win_norm: f64 = window.iter().map(|w| w * w).sum();
    let fft = Fft::new(segment_len);
    let n_freq = segment_len / 2 + 1;

    let mut accum = vec![Complex64::new(0.0, 0.0); n_freq];
    for &start in &starts {
        let xs = fft.forward(&prepare_segment(&x[start..start + segment_len], &window));
        let ys = fft.forward(&prepare_segment(&y[start..start + segment_len], &window));
        for (acc, (xk, yk)) in accum.iter_mut().zip(xs.iter().zip(ys.iter())) {
            *acc += xk * yk.conj();
        }
    }

    let scale = 1.0 / (sample_rate * win_norm * starts.len() as f64);
    for (k, acc) in accum.iter_mut().enumerate() {
        *acc *= scale;
        if k != 0 && !(segment_len % 2 == 0 && k == segment_len / 2) {
            *acc *= 2.0;
        }
    }

    Spectrum {
        frequencies: bin_frequencies(segment_len, sample_rate),
        values: accum,
    }
}

/// Magnitude-squared coherence `|Pxy|² / (Pxx · Pyy)` per bin.
///
/// Bins where `Pxx · Pyy` is zero report coherence 0.
pub fn coherence(x: &[f64], y: &[f64], sample_rate: f64, segment_len: usize) -> Spectrum<f64> {
    let pxy = cross_spectral_density(x, y, sample_rate, segment_len);
    if pxy.is_empty() {
        return Spectrum::empty();
    }
    let len = x.len().min(y.len());
    let pxx = welch_psd(&x[..len], sample_rate, segment_len);
    let pyy = welch_psd(&y[..len], sample_rate, segment_len);

    let values = pxy
        .values
        .iter()
        .zip(pxx.values.iter().zip(pyy.values.iter()))
        .map(|(pxy, (pxx, pyy))| {
            let denom = pxx * pyy;
            if denom > 0.0 {
                (pxy.norm_sqr() / denom).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect();

    Spectrum {
        frequencies: pxy.frequencies,
        values,
    }
}

/// Coherence averaged over every one-sided bin.
///
/// The segment length is `min(len, max_segment_len)`. Returns 0 for empty
/// input.
pub fn average_coherence(x: &[f64], y: &[f64], max_segment_len: usize) -> f64 {
    let len = x.len().min(y.len());
    // Sample rate cancels out of the ratio
    let coh = coherence(x, y, 1.0, max_segment_len.min(len));
    if coh.is_empty() {
        return 0.0;
    }
    coh.values.iter().sum::<f64>() / coh.len() as f64
}

/// Segment start offsets for a hop of `segment_len - overlap`.
fn segment_starts(len: usize, segment_len: usize, overlap: usize) -> Vec<usize> {
    let hop = (segment_len - overlap).max(1);
    (0..)
        .map(|i| i * hop)
        .take_while(|&start| start + segment_len <= len)
        .collect()
}

/// Subtract the mean, then window.
fn prepare_segment(segment: &[f64], window: &[f64]) -> Vec<f64> {
    let mean = segment.iter().sum::<f64>() / segment.len() as f64;
    segment
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| (s - mean) * w)
        .collect()
}

fn bin_frequencies(segment_len: usize, sample_rate: f64) -> Vec<f64> {
    (0..segment_len / 2 + 1)
        .map(|k| k as f64 * sample_rate / segment_len as f64)
        .collect()
}
