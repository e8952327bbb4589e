//! Run a full loopback scenario end to end.

use crate::commands::common::{print_report, write_report};
use clap::Args;
use loopcheck_analysis::{AlignmentEvaluator, TracingObserver};
use loopcheck_config::Scenario;
use loopcheck_io::{read_wav, write_wav};
use std::path::PathBuf;

/// Generate a test signal, distort it, and evaluate the result.
///
/// Writes `input.wav` and `output.wav` to the input directory and
/// `report.json` to the output directory.
#[derive(Args)]
pub struct RunArgs {
    /// Scenario TOML file (default: 100 Hz tone with DC offset and a pop)
    scenario: Option<PathBuf>,

    /// Directory for the generated and distorted WAV files
    #[arg(long, default_value = "test_audio")]
    input_dir: PathBuf,

    /// Directory for the evaluation report
    #[arg(long, default_value = "result")]
    output_dir: PathBuf,
}

/// Run the run command.
pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };

    println!("Scenario: {}", scenario.name);
    if let Some(description) = &scenario.description {
        println!("  {description}");
    }

    let input_path = args.input_dir.join("input.wav");
    let output_path = args.input_dir.join("output.wav");
    let report_path = args.output_dir.join("report.json");

    let original = scenario.original()?;
    write_wav(&input_path, &original)?;
    tracing::info!(path = %input_path.display(), "original written");

    let distorted = scenario.distort(&original)?;
    write_wav(&output_path, &distorted)?;
    tracing::info!(
        path = %output_path.display(),
        transforms = scenario.distortions.len(),
        "distorted copy written"
    );

    // Evaluate what actually landed on disk.
    let original = read_wav(&input_path)?;
    let recorded = read_wav(&output_path)?;

    let mut evaluator = AlignmentEvaluator::with_observer(TracingObserver)
        .with_max_segment_len(scenario.evaluation.max_segment_len)?;
    let report = evaluator.evaluate(&original, &recorded)?;

    print_report(&report);
    write_report(&report_path, &input_path, &output_path, &report)?;
    println!("\nReport saved to: {}", report_path.display());

    Ok(())
}
