//! Integration tests for loopcheck-config.
//!
//! These tests verify scenario files on disk and the buffers they produce.

use loopcheck_config::{ConfigError, DistortionConfig, Scenario, SignalConfig};
use loopcheck_core::SampleWidth;
use tempfile::TempDir;

/// Save then load gives back the same scenario.
#[test]
fn test_save_and_load_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sub").join("scenario.toml");

    let scenario = Scenario::new("lowpassed")
        .with_description("band-limited capture")
        .with_distortion(DistortionConfig::LowPass { cutoff: 4000.0 })
        .with_distortion(DistortionConfig::CutNoise {
            at_seconds: 0.5,
            channels: Some(vec![1]),
            duration_samples: 10,
        });
    scenario.save(&path).unwrap();

    let loaded = Scenario::load(&path).unwrap();
    assert_eq!(loaded, scenario);
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = Scenario::load(temp_dir.path().join("missing.toml"));
    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}

/// The default scenario produces the documented capture.
#[test]
fn test_default_scenario_buffers() {
    let scenario = Scenario::default();
    let original = scenario.original().unwrap();
    assert_eq!(original.frames(), 144_000);
    assert_eq!(original.width(), SampleWidth::Int32);
    assert_eq!(original.channels(), 2);

    let recorded = scenario.distort(&original).unwrap();
    assert_eq!(recorded.len(), original.len());

    // Pop at frame 48000 saturates channel 0 only
    let max = SampleWidth::Int32.max_amplitude();
    assert_eq!(recorded.samples()[48_000 * 2], max);
    assert_eq!(
        recorded.samples()[48_000 * 2 + 1],
        original.samples()[48_000 * 2 + 1] + 2000
    );
    // DC offset elsewhere
    assert_eq!(recorded.samples()[0], original.samples()[0] + 2000);
}

/// A hand-written file using every distortion kind parses and runs.
#[test]
fn test_full_chain_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chain.toml");
    std::fs::write(
        &path,
        r#"
name = "everything"

[signal]
freqs = [440.0, 880.0]
duration = 0.5
sample_rate = 16000
width = 2
channels = 2
amplitude = 8000.0

[[distortions]]
type = "high_pass"
cutoff = 50.0

[[distortions]]
type = "band_stop"
low = 1000.0
high = 2000.0

[[distortions]]
type = "clipping"
gain = 1.5

[[distortions]]
type = "gaussian_noise"
std_dev = 20.0
seed = 9

[[distortions]]
type = "cut_noise"
at_seconds = 0.25

[evaluation]
max_segment_len = 1024
"#,
    )
    .unwrap();

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.distortions.len(), 5);
    assert_eq!(scenario.evaluation.max_segment_len, 1024);
    assert_eq!(
        scenario.signal,
        SignalConfig {
            freqs: vec![440.0, 880.0],
            duration: 0.5,
            sample_rate: 16000,
            width: 2,
            channels: 2,
            amplitude: Some(8000.0),
        }
    );

    let original = scenario.original().unwrap();
    let first = scenario.distort(&original).unwrap();
    let second = scenario.distort(&original).unwrap();
    assert_eq!(first, second, "seeded chain must be reproducible");
}
