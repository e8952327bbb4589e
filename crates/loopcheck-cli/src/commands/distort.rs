//! Apply distortions and filters to a WAV file.

use crate::commands::common::parse_band;
use clap::Args;
use loopcheck_core::{
    DEFAULT_NOISE_CHANNELS, DEFAULT_NOISE_DURATION_SAMPLES, FilterKind, Transform,
};
use loopcheck_io::{read_wav, write_wav};
use std::path::PathBuf;

/// Apply distortions and filters to a WAV file.
///
/// Transforms run in the order their options are listed here, regardless of
/// the order given on the command line.
#[derive(Args)]
pub struct DistortArgs {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Butterworth low-pass cutoff in Hz
    #[arg(long, value_name = "HZ")]
    lowpass: Option<f64>,

    /// Butterworth high-pass cutoff in Hz
    #[arg(long, value_name = "HZ")]
    highpass: Option<f64>,

    /// Butterworth band-pass edges in Hz
    #[arg(long, value_name = "LO,HI", value_parser = parse_band)]
    bandpass: Option<(f64, f64)>,

    /// Butterworth band-stop edges in Hz
    #[arg(long, value_name = "LO,HI", value_parser = parse_band)]
    bandstop: Option<(f64, f64)>,

    /// Constant offset added to every sample
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    dc_offset: Option<f64>,

    /// Gain applied before saturating to the sample range
    #[arg(long, value_name = "G")]
    gain: Option<f64>,

    /// Insert a full-scale pop at this time in seconds
    #[arg(long, value_name = "SEC")]
    pop: Option<f64>,

    /// Cut a short segment out at this time in seconds
    #[arg(long, value_name = "SEC")]
    cut: Option<f64>,

    /// Gaussian noise standard deviation in sample units
    #[arg(long, value_name = "STD")]
    noise: Option<f64>,

    /// Seed for reproducible noise
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Channels affected by --pop and --cut (default: 0)
    #[arg(long, value_name = "0,1", value_delimiter = ',')]
    channels: Vec<usize>,

    /// Length of the pop or cut in samples
    #[arg(long, value_name = "N", default_value_t = DEFAULT_NOISE_DURATION_SAMPLES)]
    burst_samples: usize,
}

impl DistortArgs {
    fn transforms(&self) -> Vec<Transform> {
        let channels = if self.channels.is_empty() {
            DEFAULT_NOISE_CHANNELS.to_vec()
        } else {
            self.channels.clone()
        };

        let mut transforms = Vec::new();
        if let Some(cutoff) = self.lowpass {
            transforms.push(Transform::Filter(FilterKind::LowPass { cutoff }));
        }
        if let Some(cutoff) = self.highpass {
            transforms.push(Transform::Filter(FilterKind::HighPass { cutoff }));
        }
        if let Some((low, high)) = self.bandpass {
            transforms.push(Transform::Filter(FilterKind::BandPass { low, high }));
        }
        if let Some((low, high)) = self.bandstop {
            transforms.push(Transform::Filter(FilterKind::BandStop { low, high }));
        }
        if let Some(offset) = self.dc_offset {
            transforms.push(Transform::DcOffset { offset });
        }
        if let Some(gain) = self.gain {
            transforms.push(Transform::Clipping { gain });
        }
        if let Some(at_seconds) = self.pop {
            transforms.push(Transform::PopNoise {
                at_seconds,
                channels: channels.clone(),
                level: None,
                duration_samples: self.burst_samples,
            });
        }
        if let Some(at_seconds) = self.cut {
            transforms.push(Transform::CutNoise {
                at_seconds,
                channels,
                duration_samples: self.burst_samples,
            });
        }
        if let Some(std_dev) = self.noise {
            transforms.push(Transform::GaussianNoise {
                std_dev,
                seed: self.seed,
            });
        }
        transforms
    }
}

/// Run the distort command.
pub fn run(args: DistortArgs) -> anyhow::Result<()> {
    let mut buffer = read_wav(&args.input)?;
    let transforms = args.transforms();

    if transforms.is_empty() {
        tracing::warn!("no distortions requested; output is a copy of the input");
    }

    for transform in &transforms {
        buffer.apply(transform)?;
        tracing::info!(transform = ?transform, "applied");
    }

    write_wav(&args.output, &buffer)?;

    println!(
        "Applied {} transform(s): {} -> {}",
        transforms.len(),
        args.input.display(),
        args.output.display()
    );

    Ok(())
}
