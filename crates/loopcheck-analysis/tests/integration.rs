//! Integration tests for loopcheck-analysis.
//!
//! Builds buffers with loopcheck-core generators and distortions and checks
//! the evaluator end to end: identity, lag recovery in both directions, and
//! metric degradation under noise.

use loopcheck_analysis::{AlignmentEvaluator, EvaluationReport};
use loopcheck_core::{SampleBuffer, SampleWidth, SignalGenerator, Transform};

const SAMPLE_RATE: u32 = 48000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One second of bare 1 kHz, mono.
fn tone() -> SampleBuffer {
    SampleBuffer::from_sine(1.0, 1000.0, None, SAMPLE_RATE, SampleWidth::Int16, 1).unwrap()
}

/// One second of 1 kHz with a little seeded noise, mono.
fn noisy_tone() -> SampleBuffer {
    let generator = SignalGenerator::new(SAMPLE_RATE, SampleWidth::Int16, 1).unwrap();
    let mut tone = generator.sine(1.0, 1000.0, None).unwrap();
    tone.apply(&Transform::GaussianNoise {
        std_dev: 500.0,
        seed: Some(42),
    })
    .unwrap();
    tone
}

/// `buffer` with `delay` zero frames in front.
fn delayed(buffer: &SampleBuffer, delay: usize) -> SampleBuffer {
    let mut samples = vec![0; delay * buffer.channels()];
    samples.extend_from_slice(buffer.samples());
    SampleBuffer::new(samples, buffer.sample_rate(), buffer.width(), buffer.channels()).unwrap()
}

fn evaluate(original: &SampleBuffer, recorded: &SampleBuffer) -> EvaluationReport {
    AlignmentEvaluator::new()
        .evaluate(original, recorded)
        .unwrap()
}

// ===========================================================================
// 1. Identity
// ===========================================================================

#[test]
fn test_round_trip_is_perfect() {
    let original = SampleBuffer::from_sine(1.0, 1000.0, None, SAMPLE_RATE, SampleWidth::Int16, 2)
        .unwrap();
    let report = evaluate(&original, &original.copy());

    assert_eq!(report.sample_rate, SAMPLE_RATE);
    assert_eq!(report.channels.len(), 2);
    for (ch, r) in report.channels.iter().enumerate() {
        assert_eq!(r.channel, ch);
        assert_eq!(r.lag_samples, 0);
        assert_eq!(r.lag_seconds, 0.0);
        assert!((r.peak_correlation - 1.0).abs() < 1e-6, "peak {}", r.peak_correlation);
        assert_eq!(r.mean_squared_error, 0.0);
        assert!(r.average_spectral_coherence > 0.999);
        assert_eq!(r.overlap_samples, 48000);
    }
}

// ===========================================================================
// 2. Lag recovery
// ===========================================================================

#[test]
fn test_bare_sine_original_delayed_gives_positive_lag() {
    let recorded = tone();
    let original = delayed(&recorded, 100);

    let r = &evaluate(&original, &recorded).channels[0];
    assert!((r.lag_samples - 100).abs() <= 1, "lag {}", r.lag_samples);
    assert!(r.peak_correlation > 0.99, "peak {}", r.peak_correlation);
}

#[test]
fn test_bare_sine_recorded_delayed_gives_negative_lag() {
    let original = tone();
    let recorded = delayed(&original, 100);

    let r = &evaluate(&original, &recorded).channels[0];
    assert_eq!(r.lag_samples, -100);
    assert_eq!(r.mean_squared_error, 0.0);
    assert!(r.average_spectral_coherence > 0.999);
}

#[test]
fn test_original_delayed_gives_positive_lag() {
    let recorded = noisy_tone();
    let original = delayed(&recorded, 100);

    let r = &evaluate(&original, &recorded).channels[0];
    assert!((r.lag_samples - 100).abs() <= 1, "lag {}", r.lag_samples);
    assert!((r.lag_seconds - 100.0 / 48000.0).abs() < 1e-4);
    assert!(r.peak_correlation > 0.9);
}

#[test]
fn test_recorded_delayed_gives_negative_lag() {
    let original = noisy_tone();
    let recorded = delayed(&original, 100);

    let r = &evaluate(&original, &recorded).channels[0];
    assert!((r.lag_samples + 100).abs() <= 1, "lag {}", r.lag_samples);
}

#[test]
fn test_aligned_overlap_matches_exactly() {
    let original = noisy_tone();
    let recorded = delayed(&original, 100);

    let r = &evaluate(&original, &recorded).channels[0];
    assert_eq!(r.lag_samples, -100);
    assert_eq!(r.overlap_samples, 48000);
    assert_eq!(r.mean_squared_error, 0.0);
    assert!(r.average_spectral_coherence > 0.999);
}

// ===========================================================================
// 3. Distortions
// ===========================================================================

#[test]
fn test_noise_degrades_metrics() {
    let original = SampleBuffer::from_sine(1.0, 1000.0, None, SAMPLE_RATE, SampleWidth::Int16, 1)
        .unwrap();
    let mut recorded = original.copy();
    recorded
        .apply(&Transform::GaussianNoise {
            std_dev: 3000.0,
            seed: Some(7),
        })
        .unwrap();

    let r = &evaluate(&original, &recorded).channels[0];
    assert_eq!(r.lag_samples, 0);
    assert!(r.mean_squared_error > 1.0e6);
    assert!(r.average_spectral_coherence < 0.9);
}

#[test]
fn test_dc_offset_and_pop_keep_alignment() {
    let original = SampleBuffer::from_sine(3.0, 100.0, None, SAMPLE_RATE, SampleWidth::Int32, 2)
        .unwrap();
    let mut recorded = original.copy();
    recorded
        .apply(&Transform::DcOffset { offset: 2000.0 })
        .unwrap()
        .apply(&Transform::PopNoise {
            at_seconds: 1.0,
            channels: vec![0, 1],
            level: None,
            duration_samples: 5,
        })
        .unwrap();

    let report = evaluate(&original, &recorded);
    for r in &report.channels {
        assert_eq!(r.lag_samples, 0);
        assert!(r.mean_squared_error > 0.0);
        assert!(r.average_spectral_coherence > 0.0 && r.average_spectral_coherence <= 1.0);
    }
}

#[test]
fn test_report_serializes_to_json() {
    let original = SampleBuffer::from_sine(0.1, 440.0, None, SAMPLE_RATE, SampleWidth::Int16, 1)
        .unwrap();
    let report = evaluate(&original, &original.copy());

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"lag_samples\":0"));
    let back: EvaluationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
