//! Butterworth IIR filter design and per-channel application.
//!
//! Designs follow the classic digital Butterworth procedure:
//!
//! 1. Analog low-pass prototype with poles on the unit circle in the left
//!    half plane, `p_k = -exp(iπ·m/(2N))` for `m = -N+1, -N+3, …, N-1`.
//! 2. Pre-warp the normalized cutoffs, `w = 4·tan(π·wn/2)` (bilinear
//!    transform with fs = 2).
//! 3. Frequency transform in zero/pole/gain form: low-pass to low-pass,
//!    high-pass, band-pass, or band-stop.
//! 4. Bilinear transform to the z-plane.
//! 5. Group conjugate pole and zero pairs into second-order sections.
//!
//! Band designs double the order, so a 4th-order band-pass has 8 poles.
//!
//! Cutoffs are normalized by the Nyquist frequency and must lie strictly
//! inside `(0, 1)`.

use num_complex::Complex64;

use crate::biquad::Biquad;
use crate::buffer::SampleBuffer;
use crate::error::{Error, Result};

/// Order used by the built-in filter transforms.
pub const BUTTERWORTH_ORDER: usize = 4;

/// Imaginary parts below this are treated as real roots when pairing sections.
const REAL_ROOT_TOLERANCE: f64 = 1e-10;

/// Low-pass or high-pass selection for [`pass_filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassType {
    /// Keep frequencies below the cutoff.
    Low,
    /// Keep frequencies above the cutoff.
    High,
}

/// Filter response and cutoff frequencies in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// Keep frequencies below `cutoff`.
    LowPass {
        /// Cutoff in Hz.
        cutoff: f64,
    },
    /// Keep frequencies above `cutoff`.
    HighPass {
        /// Cutoff in Hz.
        cutoff: f64,
    },
    /// Keep frequencies between `low` and `high`.
    BandPass {
        /// Lower edge in Hz.
        low: f64,
        /// Upper edge in Hz.
        high: f64,
    },
    /// Reject frequencies between `low` and `high`.
    BandStop {
        /// Lower edge in Hz.
        low: f64,
        /// Upper edge in Hz.
        high: f64,
    },
}

impl FilterKind {
    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::LowPass { .. } => "low-pass",
            FilterKind::HighPass { .. } => "high-pass",
            FilterKind::BandPass { .. } => "band-pass",
            FilterKind::BandStop { .. } => "band-stop",
        }
    }
}

/// Coefficients of one second-order section, `a[0]` normalized to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondOrderSection {
    /// Numerator `[b0, b1, b2]`.
    pub b: [f64; 3],
    /// Denominator `[1, a1, a2]`.
    pub a: [f64; 3],
}

impl SecondOrderSection {
    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = self.b[0] + z_inv * self.b[1] + z_inv2 * self.b[2];
        let den = self.a[0] + z_inv * self.a[1] + z_inv2 * self.a[2];
        num / den
    }
}

/// A digital Butterworth filter as a cascade of second-order sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ButterworthDesign {
    kind: FilterKind,
    order: usize,
    sample_rate: u32,
    sections: Vec<SecondOrderSection>,
}

impl ButterworthDesign {
    /// Design a Butterworth filter of the given prototype order.
    pub fn new(order: usize, kind: FilterKind, sample_rate: u32) -> Result<Self> {
        if order == 0 {
            return Err(Error::invalid("filter order must be at least 1"));
        }
        if sample_rate == 0 {
            return Err(Error::invalid("sample rate must be positive"));
        }
        let nyquist = 0.5 * sample_rate as f64;
        let prototype = Zpk::prototype(order);

        let analog = match kind {
            FilterKind::LowPass { cutoff } => {
                let wn = normalize(cutoff, nyquist)?;
                prototype.lp_to_lp(prewarp(wn))
            }
            FilterKind::HighPass { cutoff } => {
                let wn = normalize(cutoff, nyquist)?;
                prototype.lp_to_hp(prewarp(wn))
            }
            FilterKind::BandPass { low, high } => {
                let (w1, w2) = band_edges(low, high, nyquist)?;
                prototype.lp_to_bp((w1 * w2).sqrt(), w2 - w1)
            }
            FilterKind::BandStop { low, high } => {
                let (w1, w2) = band_edges(low, high, nyquist)?;
                prototype.lp_to_bs((w1 * w2).sqrt(), w2 - w1)
            }
        };

        Ok(Self {
            kind,
            order,
            sample_rate,
            sections: analog.bilinear().into_sections(),
        })
    }

    /// The response this design was built for.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Prototype order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Sample rate the cutoffs were normalized against.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Second-order sections, applied in order.
    pub fn sections(&self) -> &[SecondOrderSection] {
        &self.sections
    }

    /// Fresh cascade of biquads with zero initial state.
    pub fn cascade(&self) -> Cascade {
        Cascade {
            stages: self
                .sections
                .iter()
                .map(|s| Biquad::with_coefficients(s.b, s.a))
                .collect(),
        }
    }

    /// Magnitude of the frequency response at `freq_hz`.
    pub fn magnitude_at(&self, freq_hz: f64) -> f64 {
        let omega = 2.0 * core::f64::consts::PI * freq_hz / self.sample_rate as f64;
        let z_inv = Complex64::from_polar(1.0, -omega);
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm()
    }
}

/// Biquad chain carrying filter state across samples.
#[derive(Debug, Clone)]
pub struct Cascade {
    stages: Vec<Biquad>,
}

impl Cascade {
    /// Process one sample through every section.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.stages
            .iter_mut()
            .fold(input, |acc, stage| stage.process(acc))
    }

    /// Reset every section to zero state.
    pub fn clear(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
    }
}

/// Apply a 4th-order Butterworth design to every channel of `buffer`.
///
/// Each de-interleaved channel is filtered independently from zero initial
/// state; the output is re-interleaved, clamped, and truncated to the
/// sample type. Length is preserved.
pub fn filter(buffer: &SampleBuffer, kind: FilterKind) -> Result<Vec<i32>> {
    let design = ButterworthDesign::new(BUTTERWORTH_ORDER, kind, buffer.sample_rate())?;
    apply_design(buffer, &design)
}

/// Low-pass or high-pass filter at `cutoff` Hz.
pub fn pass_filter(buffer: &SampleBuffer, cutoff: f64, pass: PassType) -> Result<Vec<i32>> {
    let kind = match pass {
        PassType::Low => FilterKind::LowPass { cutoff },
        PassType::High => FilterKind::HighPass { cutoff },
    };
    filter(buffer, kind)
}

/// Band-pass filter between `low` and `high` Hz.
pub fn band_pass_filter(buffer: &SampleBuffer, low: f64, high: f64) -> Result<Vec<i32>> {
    filter(buffer, FilterKind::BandPass { low, high })
}

/// Band-stop filter between `low` and `high` Hz.
pub fn band_stop_filter(buffer: &SampleBuffer, low: f64, high: f64) -> Result<Vec<i32>> {
    filter(buffer, FilterKind::BandStop { low, high })
}

/// Apply an existing design to every channel of `buffer`.
pub fn apply_design(buffer: &SampleBuffer, design: &ButterworthDesign) -> Result<Vec<i32>> {
    if design.sample_rate() != buffer.sample_rate() {
        return Err(Error::incompatible(format!(
            "filter designed for {} Hz applied to {} Hz buffer",
            design.sample_rate(),
            buffer.sample_rate()
        )));
    }

    let width = buffer.width();
    let stride = buffer.channels();
    let input = buffer.samples();
    let mut out = vec![0i32; input.len()];

    let mut cascade = design.cascade();
    for ch in 0..stride {
        cascade.clear();
        for idx in (ch..input.len()).step_by(stride) {
            out[idx] = width.saturate(cascade.process(input[idx] as f64));
        }
    }
    Ok(out)
}

fn normalize(cutoff: f64, nyquist: f64) -> Result<f64> {
    let wn = cutoff / nyquist;
    if wn.is_finite() && wn > 0.0 && wn < 1.0 {
        Ok(wn)
    } else {
        Err(Error::invalid(format!(
            "cutoff {cutoff} Hz must lie strictly between 0 and Nyquist ({nyquist} Hz)"
        )))
    }
}

fn band_edges(low: f64, high: f64, nyquist: f64) -> Result<(f64, f64)> {
    let w1 = normalize(low, nyquist)?;
    let w2 = normalize(high, nyquist)?;
    if w1 >= w2 {
        return Err(Error::invalid(format!(
            "band edges must satisfy low < high, got {low} Hz and {high} Hz"
        )));
    }
    Ok((prewarp(w1), prewarp(w2)))
}

/// Analog frequency for a normalized digital cutoff, bilinear transform with fs = 2.
fn prewarp(wn: f64) -> f64 {
    4.0 * (core::f64::consts::PI * wn / 2.0).tan()
}

/// Zero/pole/gain representation used during design.
#[derive(Debug, Clone)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

impl Zpk {
    fn prototype(order: usize) -> Self {
        let n = order as f64;
        let poles = (0..order)
            .map(|k| {
                let m = 2.0 * k as f64 - n + 1.0;
                -Complex64::from_polar(1.0, core::f64::consts::PI * m / (2.0 * n))
            })
            .collect();
        Self {
            zeros: Vec::new(),
            poles,
            gain: 1.0,
        }
    }

    fn degree(&self) -> usize {
        self.poles.len() - self.zeros.len()
    }

    /// `k · Π(-z) / Π(-p)`, real part.
    fn reflected_gain(&self) -> f64 {
        let num: Complex64 = self.zeros.iter().map(|&z| -z).product();
        let den: Complex64 = self.poles.iter().map(|&p| -p).product();
        self.gain * (num / den).re
    }

    fn lp_to_lp(self, wo: f64) -> Self {
        let degree = self.degree() as i32;
        Self {
            zeros: self.zeros.iter().map(|&z| z * wo).collect(),
            poles: self.poles.iter().map(|&p| p * wo).collect(),
            gain: self.gain * wo.powi(degree),
        }
    }

    fn lp_to_hp(self, wo: f64) -> Self {
        let degree = self.degree();
        let gain = self.reflected_gain();
        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|&z| wo / z).collect();
        zeros.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), degree));
        Self {
            zeros,
            poles: self.poles.iter().map(|&p| wo / p).collect(),
            gain,
        }
    }

    fn lp_to_bp(self, wo: f64, bw: f64) -> Self {
        let degree = self.degree();
        let mut zeros = split_band(&self.zeros, |&z| z * (bw / 2.0), wo);
        zeros.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), degree));
        Self {
            zeros,
            poles: split_band(&self.poles, |&p| p * (bw / 2.0), wo),
            gain: self.gain * bw.powi(degree as i32),
        }
    }

    fn lp_to_bs(self, wo: f64, bw: f64) -> Self {
        let degree = self.degree();
        let gain = self.reflected_gain();
        let mut zeros = split_band(&self.zeros, |&z| (bw / 2.0) / z, wo);
        zeros.extend(std::iter::repeat_n(Complex64::new(0.0, wo), degree));
        zeros.extend(std::iter::repeat_n(Complex64::new(0.0, -wo), degree));
        Self {
            zeros,
            poles: split_band(&self.poles, |&p| (bw / 2.0) / p, wo),
            gain,
        }
    }

    fn bilinear(self) -> Self {
        const FS2: f64 = 4.0;
        let degree = self.degree();
        let num: Complex64 = self.zeros.iter().map(|&z| FS2 - z).product();
        let den: Complex64 = self.poles.iter().map(|&p| FS2 - p).product();

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|&z| (FS2 + z) / (FS2 - z)).collect();
        zeros.extend(std::iter::repeat_n(Complex64::new(-1.0, 0.0), degree));
        Self {
            zeros,
            poles: self.poles.iter().map(|&p| (FS2 + p) / (FS2 - p)).collect(),
            gain: self.gain * (num / den).re,
        }
    }

    fn into_sections(self) -> Vec<SecondOrderSection> {
        let pole_quads = quadratics(&self.poles);
        let zero_quads = quadratics(&self.zeros);
        let count = pole_quads.len().max(zero_quads.len());

        (0..count)
            .map(|i| {
                let mut b = zero_quads.get(i).copied().unwrap_or([1.0, 0.0, 0.0]);
                let a = pole_quads.get(i).copied().unwrap_or([1.0, 0.0, 0.0]);
                if i == 0 {
                    for coeff in &mut b {
                        *coeff *= self.gain;
                    }
                }
                SecondOrderSection { b, a }
            })
            .collect()
    }
}

/// Each scaled root `r` becomes the pair `r ± sqrt(r² - wo²)`.
fn split_band(
    roots: &[Complex64],
    scale: impl Fn(&Complex64) -> Complex64,
    wo: f64,
) -> Vec<Complex64> {
    let scaled: Vec<Complex64> = roots.iter().map(scale).collect();
    let offsets: Vec<Complex64> = scaled.iter().map(|&r| (r * r - wo * wo).sqrt()).collect();
    scaled
        .iter()
        .zip(&offsets)
        .map(|(&r, &d)| r + d)
        .chain(scaled.iter().zip(&offsets).map(|(&r, &d)| r - d))
        .collect()
}

/// Monic quadratics `[1, -(r1+r2), r1·r2]` from conjugate pairs and paired real roots.
///
/// Roots in the lower half plane are skipped; their conjugates in the upper
/// half plane stand for the pair.
fn quadratics(roots: &[Complex64]) -> Vec<[f64; 3]> {
    let mut quads: Vec<[f64; 3]> = roots
        .iter()
        .filter(|r| r.im > REAL_ROOT_TOLERANCE)
        .map(|r| [1.0, -2.0 * r.re, r.norm_sqr()])
        .collect();

    let mut reals: Vec<f64> = roots
        .iter()
        .filter(|r| r.im.abs() <= REAL_ROOT_TOLERANCE)
        .map(|r| r.re)
        .collect();
    reals.sort_by(f64::total_cmp);

    quads.extend(reals.chunks(2).map(|pair| match pair {
        [r1, r2] => [1.0, -(r1 + r2), r1 * r2],
        [r] => [1.0, -r, 0.0],
        _ => unreachable!("chunks(2) yields one or two roots"),
    }));
    quads
}
