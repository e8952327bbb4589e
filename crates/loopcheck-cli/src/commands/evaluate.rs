//! Align a recording with its original and report similarity metrics.

use crate::commands::common::{print_report, write_report};
use clap::Args;
use loopcheck_analysis::{AlignmentEvaluator, DEFAULT_SEGMENT_LEN, TracingObserver};
use loopcheck_io::read_wav;
use std::path::PathBuf;

/// Compare a recorded WAV file against its original.
#[derive(Args)]
pub struct EvaluateArgs {
    /// Original (reference) WAV file
    original: PathBuf,

    /// Recorded WAV file
    recorded: PathBuf,

    /// Maximum Welch segment length for coherence
    #[arg(long, default_value_t = DEFAULT_SEGMENT_LEN)]
    segment: usize,

    /// Write the report as JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Run the evaluate command.
pub fn run(args: EvaluateArgs) -> anyhow::Result<()> {
    let original = read_wav(&args.original)?;
    let recorded = read_wav(&args.recorded)?;

    let mut evaluator =
        AlignmentEvaluator::with_observer(TracingObserver).with_max_segment_len(args.segment)?;
    let report = evaluator.evaluate(&original, &recorded)?;

    print_report(&report);

    if let Some(path) = &args.output {
        write_report(path, &args.original, &args.recorded, &report)?;
        println!("\nReport saved to: {}", path.display());
    }

    Ok(())
}
