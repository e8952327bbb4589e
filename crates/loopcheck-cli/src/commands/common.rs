//! Shared CLI helpers used across multiple commands.

use loopcheck_analysis::EvaluationReport;
use std::path::Path;

/// Parse a `LO,HI` frequency band for clap's `value_parser`.
pub fn parse_band(s: &str) -> Result<(f64, f64), String> {
    let (low, high) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid band: '{s}' (expected LO,HI)"))?;
    let low: f64 = low
        .trim()
        .parse()
        .map_err(|_| format!("Invalid lower edge: '{low}'"))?;
    let high: f64 = high
        .trim()
        .parse()
        .map_err(|_| format!("Invalid upper edge: '{high}'"))?;
    Ok((low, high))
}

/// Print a per-channel metrics table.
pub fn print_report(report: &EvaluationReport) {
    println!();
    println!("Alignment Report");
    println!("================");
    println!("Sample rate: {} Hz", report.sample_rate);
    println!();
    println!(
        "  {:>7}  {:>10}  {:>10}  {:>9}  {:>14}  {:>9}",
        "channel", "lag", "lag (ms)", "peak", "mse", "coherence"
    );
    for result in &report.channels {
        println!(
            "  {:>7}  {:>10}  {:>10.3}  {:>9.4}  {:>14.3}  {:>9.4}",
            result.channel,
            result.lag_samples,
            result.lag_seconds * 1000.0,
            result.peak_correlation,
            result.mean_squared_error,
            result.average_spectral_coherence,
        );
    }
}

/// Write a report as pretty JSON alongside the compared file names.
pub fn write_report(
    path: &Path,
    original: &Path,
    recorded: &Path,
    report: &EvaluationReport,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::json!({
        "original": original.display().to_string(),
        "recorded": recorded.display().to_string(),
        "sample_rate": report.sample_rate,
        "channels": report.channels,
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
