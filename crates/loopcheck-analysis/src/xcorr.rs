//! Full linear cross-correlation via FFT, with peak-lag detection.
//!
//! # Definition
//!
//! For signals `a` (length `La`) and `v` (length `Lv`):
//!
//! ```text
//! c[k] = Σ_n a[n + k] · v[n],    k = -(Lv - 1) … (La - 1)
//! ```
//!
//! The output has `La + Lv - 1` entries; index `i` holds lag
//! `k = i - (Lv - 1)`. If `a` is `v` delayed by `D` samples, the peak sits at
//! `k = +D`; if `v` is the delayed one, at `k = -D`.
//!
//! # FFT-based Computation
//!
//! Uses the cross-correlation theorem
//!
//! ```text
//! c = IFFT( conj(V(f)) · A(f) )
//! ```
//!
//! with both signals zero-padded to a power of two at least `La + Lv - 1`
//! long so the circular result has no wrap-around.
//!
//! # References
//!
//! - Oppenheim & Schafer, "Discrete-Time Signal Processing" (3rd ed.), section 2.8.

use crate::fft::Fft;
use rustfft::num_complex::Complex64;

/// Full cross-correlation of `a` against `v`.
///
/// Returns `a.len() + v.len() - 1` values, or an empty vector if either
/// input is empty.
pub fn xcorr_full(a: &[f64], v: &[f64]) -> Vec<f64> {
    if a.is_empty() || v.is_empty() {
        return Vec::new();
    }
    let out_len = a.len() + v.len() - 1;
    let fft_size = out_len.next_power_of_two().max(2);
    let fft = Fft::new(fft_size);

    let mut buf_a = padded(a, fft_size);
    let mut buf_v = padded(v, fft_size);
    fft.forward_complex(&mut buf_a);
    fft.forward_complex(&mut buf_v);

    for (ca, cv) in buf_a.iter_mut().zip(buf_v.iter()) {
        *ca *= cv.conj();
    }
    fft.inverse_complex(&mut buf_a);

    // Circular layout: lag k >= 0 at index k, lag k < 0 at fft_size + k
    let first_lag = -(v.len() as i64 - 1);
    (0..out_len)
        .map(|i| {
            let lag = first_lag + i as i64;
            let idx = if lag >= 0 {
                lag as usize
            } else {
                (fft_size as i64 + lag) as usize
            };
            buf_a[idx].re
        })
        .collect()
}

/// Direct O(La·Lv) evaluation with the same layout as [`xcorr_full`].
pub fn xcorr_direct(a: &[f64], v: &[f64]) -> Vec<f64> {
    if a.is_empty() || v.is_empty() {
        return Vec::new();
    }
    let first_lag = -(v.len() as i64 - 1);
    (0..a.len() + v.len() - 1)
        .map(|i| {
            let lag = first_lag + i as i64;
            v.iter()
                .enumerate()
                .filter_map(|(n, &vn)| {
                    let m = n as i64 + lag;
                    (m >= 0 && (m as usize) < a.len()).then(|| a[m as usize] * vn)
                })
                .sum()
        })
        .collect()
}

/// Index and value of the first maximum.
///
/// Returns `None` for an empty slice. NaN entries are never selected.
pub fn peak(correlation: &[f64]) -> Option<(usize, f64)> {
    correlation
        .iter()
        .enumerate()
        .fold(None, |best, (i, &c)| match best {
            Some((_, b)) if c <= b || c.is_nan() => best,
            None if c.is_nan() => None,
            _ => Some((i, c)),
        })
}

/// Lag in samples for an index into a full correlation whose second input had `v_len` samples.
pub fn index_to_lag(index: usize, v_len: usize) -> i64 {
    index as i64 - (v_len as i64 - 1)
}

fn padded(signal: &[f64], size: usize) -> Vec<Complex64> {
    let mut buf: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    buf.resize(size, Complex64::new(0.0, 0.0));
    buf
}
