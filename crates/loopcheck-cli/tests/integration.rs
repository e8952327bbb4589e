//! Integration tests for loopcheck-cli.
//!
//! Tests invoke the `loopcheck` binary and inspect the files it writes.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to get the path to the `loopcheck` binary built by cargo.
fn loopcheck_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_loopcheck"))
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "loopcheck {what} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn generate_tone(path: &Path, extra: &[&str]) {
    let output = loopcheck_bin()
        .args(["generate", "tone", path.to_str().unwrap()])
        .args(extra)
        .output()
        .expect("failed to run loopcheck generate tone");
    assert_success(&output, "generate tone");
}

// ---------------------------------------------------------------------------
// CLI binary tests -- top level
// ---------------------------------------------------------------------------

#[test]
fn cli_help_works() {
    let output = loopcheck_bin()
        .arg("--help")
        .output()
        .expect("failed to run loopcheck --help");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Audio loopback verification toolkit"));
    for command in ["generate", "distort", "evaluate", "run", "info"] {
        assert!(stdout.contains(command), "help should list '{command}'");
    }
}

#[test]
fn cli_version_works() {
    let output = loopcheck_bin()
        .arg("--version")
        .output()
        .expect("failed to run loopcheck --version");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("loopcheck"));
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `loopcheck generate`
// ---------------------------------------------------------------------------

#[test]
fn cli_generate_tone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");

    generate_tone(
        &path,
        &["--freq", "440", "--duration", "0.1", "--width", "2"],
    );

    let loaded = loopcheck_io::read_wav(&path).unwrap();
    assert_eq!(loaded.sample_rate(), 48000);
    assert_eq!(loaded.channels(), 2);
    assert_eq!(loaded.frames(), 4800);
    assert_eq!(loaded.width().bytes(), 2);
}

#[test]
fn cli_generate_multi_respects_amplitude() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.wav");

    let output = loopcheck_bin()
        .args([
            "generate",
            "multi",
            path.to_str().unwrap(),
            "--freqs",
            "100,200",
            "--duration",
            "1",
            "--amplitude",
            "1000",
            "--channels",
            "1",
        ])
        .output()
        .expect("failed to run loopcheck generate multi");
    assert_success(&output, "generate multi");

    let loaded = loopcheck_io::read_wav(&path).unwrap();
    assert_eq!(loaded.channels(), 1);
    assert!(loaded.samples().iter().all(|s| s.abs() <= 1000));
}

#[test]
fn cli_generate_rejects_bad_width() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");

    let output = loopcheck_bin()
        .args(["generate", "tone", path.to_str().unwrap(), "--width", "5"])
        .output()
        .expect("failed to run loopcheck generate tone");

    assert!(!output.status.success());
    assert!(!path.exists());
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `loopcheck distort`
// ---------------------------------------------------------------------------

#[test]
fn cli_distort_dc_offset() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");

    generate_tone(
        &input,
        &["--duration", "0.1", "--width", "2", "--amplitude", "1000"],
    );

    let output = loopcheck_bin()
        .args([
            "distort",
            input.to_str().unwrap(),
            output_path.to_str().unwrap(),
            "--dc-offset",
            "-500",
        ])
        .output()
        .expect("failed to run loopcheck distort");
    assert_success(&output, "distort");

    let original = loopcheck_io::read_wav(&input).unwrap();
    let distorted = loopcheck_io::read_wav(&output_path).unwrap();
    assert_eq!(original.len(), distorted.len());
    for (o, d) in original.samples().iter().zip(distorted.samples()) {
        assert_eq!(*d, o - 500);
    }
}

#[test]
fn cli_distort_pop_on_one_channel() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");

    generate_tone(
        &input,
        &["--duration", "0.5", "--width", "2", "--amplitude", "1000"],
    );

    let output = loopcheck_bin()
        .args([
            "distort",
            input.to_str().unwrap(),
            output_path.to_str().unwrap(),
            "--pop",
            "0.25",
            "--channels",
            "1",
        ])
        .output()
        .expect("failed to run loopcheck distort");
    assert_success(&output, "distort");

    let original = loopcheck_io::read_wav(&input).unwrap();
    let distorted = loopcheck_io::read_wav(&output_path).unwrap();
    assert_eq!(original.channel(0).unwrap(), distorted.channel(0).unwrap());
    assert_eq!(distorted.channel(1).unwrap().iter().max(), Some(&32767));
}

#[test]
fn cli_distort_pop_defaults_to_first_channel() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");

    generate_tone(
        &input,
        &["--duration", "0.5", "--width", "2", "--amplitude", "1000"],
    );

    let output = loopcheck_bin()
        .args([
            "distort",
            input.to_str().unwrap(),
            output_path.to_str().unwrap(),
            "--pop",
            "0.25",
        ])
        .output()
        .expect("failed to run loopcheck distort");
    assert_success(&output, "distort");

    let original = loopcheck_io::read_wav(&input).unwrap();
    let distorted = loopcheck_io::read_wav(&output_path).unwrap();
    assert_eq!(distorted.channel(0).unwrap().iter().max(), Some(&32767));
    assert_eq!(original.channel(1).unwrap(), distorted.channel(1).unwrap());
}

#[test]
fn cli_distort_rejects_malformed_band() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    generate_tone(&input, &["--duration", "0.1"]);

    let output = loopcheck_bin()
        .args([
            "distort",
            input.to_str().unwrap(),
            dir.path().join("out.wav").to_str().unwrap(),
            "--bandpass",
            "300",
        ])
        .output()
        .expect("failed to run loopcheck distort");

    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `loopcheck evaluate`
// ---------------------------------------------------------------------------

#[test]
fn cli_evaluate_writes_json_report() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let noisy = dir.path().join("noisy.wav");
    let report = dir.path().join("reports").join("report.json");

    generate_tone(&input, &["--duration", "0.5", "--width", "2"]);

    let output = loopcheck_bin()
        .args([
            "distort",
            input.to_str().unwrap(),
            noisy.to_str().unwrap(),
            "--noise",
            "200",
            "--seed",
            "7",
        ])
        .output()
        .expect("failed to run loopcheck distort");
    assert_success(&output, "distort");

    let output = loopcheck_bin()
        .args([
            "evaluate",
            input.to_str().unwrap(),
            noisy.to_str().unwrap(),
            "--segment",
            "1024",
            "--output",
            report.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run loopcheck evaluate");
    assert_success(&output, "evaluate");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Alignment Report"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["sample_rate"], 48000);
    let channels = json["channels"].as_array().unwrap();
    assert_eq!(channels.len(), 2);
    for channel in channels {
        assert_eq!(channel["lag_samples"], 0);
        assert!(channel["peak_correlation"].as_f64().unwrap() > 0.9);
        assert!(channel["mean_squared_error"].as_f64().unwrap() > 0.0);
    }
}

#[test]
fn cli_evaluate_rejects_channel_mismatch() {
    let dir = TempDir::new().unwrap();
    let stereo = dir.path().join("stereo.wav");
    let mono = dir.path().join("mono.wav");

    generate_tone(&stereo, &["--duration", "0.1"]);
    generate_tone(&mono, &["--duration", "0.1", "--channels", "1"]);

    let output = loopcheck_bin()
        .args(["evaluate", stereo.to_str().unwrap(), mono.to_str().unwrap()])
        .output()
        .expect("failed to run loopcheck evaluate");

    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `loopcheck run`
// ---------------------------------------------------------------------------

#[test]
fn cli_run_scenario_end_to_end() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.toml");
    let input_dir = dir.path().join("test_audio");
    let output_dir = dir.path().join("result");

    std::fs::write(
        &scenario,
        r#"
name = "short"

[signal]
freqs = [100.0]
duration = 1.0
sample_rate = 48000
width = 2
channels = 2

[[distortions]]
type = "dc_offset"
offset = 2000.0

[[distortions]]
type = "pop_noise"
at_seconds = 0.5
"#,
    )
    .unwrap();

    let output = loopcheck_bin()
        .args([
            "run",
            scenario.to_str().unwrap(),
            "--input-dir",
            input_dir.to_str().unwrap(),
            "--output-dir",
            output_dir.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run loopcheck run");
    assert_success(&output, "run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Scenario: short"));

    let input = loopcheck_io::read_wav(input_dir.join("input.wav")).unwrap();
    let recorded = loopcheck_io::read_wav(input_dir.join("output.wav")).unwrap();
    assert_eq!(input.len(), recorded.len());

    // Pop without explicit channels lands on channel 0 only
    assert_eq!(recorded.channel(0).unwrap().iter().max(), Some(&32767));
    let shifted: Vec<i32> = input.channel(1).unwrap().iter().map(|s| s + 2000).collect();
    assert_eq!(recorded.channel(1).unwrap(), shifted);

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output_dir.join("report.json")).unwrap(),
    )
    .unwrap();
    let channels = json["channels"].as_array().unwrap();
    assert_eq!(channels.len(), 2);
    for channel in channels {
        assert_eq!(channel["lag_samples"], 0);
    }
}

#[test]
fn cli_run_missing_scenario_fails() {
    let dir = TempDir::new().unwrap();

    let output = loopcheck_bin()
        .args([
            "run",
            dir.path().join("missing.toml").to_str().unwrap(),
            "--input-dir",
            dir.path().join("a").to_str().unwrap(),
            "--output-dir",
            dir.path().join("b").to_str().unwrap(),
        ])
        .output()
        .expect("failed to run loopcheck run");

    assert!(!output.status.success());
    assert!(!dir.path().join("a").exists());
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `loopcheck info`
// ---------------------------------------------------------------------------

#[test]
fn cli_info_shows_wav_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    generate_tone(
        &path,
        &["--duration", "0.5", "--sample-rate", "44100", "--width", "3"],
    );

    let output = loopcheck_bin()
        .args(["info", path.to_str().unwrap()])
        .output()
        .expect("failed to run loopcheck info");
    assert_success(&output, "info");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("44100"), "should show sample rate, got: {stdout}");
    assert!(stdout.contains("PCM 24-bit"), "should show format, got: {stdout}");
    assert!(stdout.contains("22050 frames"), "should show frames, got: {stdout}");
}

#[test]
fn cli_info_nonexistent_file_fails() {
    let output = loopcheck_bin()
        .args(["info", "/nonexistent/path/tone.wav"])
        .output()
        .expect("failed to run loopcheck info");

    assert!(!output.status.success());
}
