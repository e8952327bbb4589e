//! Generate sine test signals.

use clap::{Args, Subcommand};
use loopcheck_core::{SampleWidth, SignalGenerator};
use loopcheck_io::write_wav;
use std::path::PathBuf;

/// Generate test signals.
#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate a single sine tone
    Tone {
        /// Output WAV file
        output: PathBuf,

        /// Frequency in Hz
        #[arg(long, default_value = "100")]
        freq: f64,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Generate the average of several sine tones
    Multi {
        /// Output WAV file
        output: PathBuf,

        /// Comma-separated frequencies in Hz
        #[arg(long, value_delimiter = ',', required = true)]
        freqs: Vec<f64>,

        #[command(flatten)]
        format: FormatArgs,
    },
}

#[derive(Args)]
struct FormatArgs {
    /// Duration in seconds
    #[arg(short, long, default_value = "3.0")]
    duration: f64,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Bytes per sample (1-4)
    #[arg(long, default_value = "4")]
    width: usize,

    /// Number of channels
    #[arg(long, default_value = "2")]
    channels: usize,

    /// Peak amplitude in sample units (default: 90% of full scale)
    #[arg(long)]
    amplitude: Option<f64>,
}

impl FormatArgs {
    fn generator(&self) -> anyhow::Result<SignalGenerator> {
        let width = SampleWidth::from_bytes(self.width)?;
        Ok(SignalGenerator::new(self.sample_rate, width, self.channels)?)
    }
}

/// Run the generate command.
pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let (output, buffer, description) = match args.command {
        GenerateCommand::Tone {
            output,
            freq,
            format,
        } => {
            let buffer = format
                .generator()?
                .sine(format.duration, freq, format.amplitude)?;
            (output, buffer, format!("{freq} Hz sine"))
        }
        GenerateCommand::Multi {
            output,
            freqs,
            format,
        } => {
            let buffer = format
                .generator()?
                .multi_sine(format.duration, &freqs, format.amplitude)?;
            let list: Vec<String> = freqs.iter().map(|f| format!("{f}")).collect();
            (output, buffer, format!("{} Hz multi-tone", list.join("+")))
        }
    };

    write_wav(&output, &buffer)?;

    println!(
        "Generated {} ({:.2}s, {} ch, {}-bit) -> {}",
        description,
        buffer.duration_seconds(),
        buffer.channels(),
        buffer.width().bits(),
        output.display()
    );

    Ok(())
}
