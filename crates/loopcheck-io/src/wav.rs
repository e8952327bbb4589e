//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use loopcheck_core::{SampleBuffer, SampleWidth};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len()); // total across all channels
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// Read an integer PCM WAV file into a [`SampleBuffer`].
///
/// Samples keep their stored integer values, so a write followed by a read
/// is lossless. The sample width is `bits_per_sample / 8`.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] for float data or bit depths other than
/// 8, 16, 24, or 32.
///
/// # Example
/// ```ignore
/// let buffer = read_wav("capture.wav")?;
/// println!("{} frames at {} Hz", buffer.frames(), buffer.sample_rate());
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_format == SampleFormat::Float {
        return Err(Error::UnsupportedFormat(format!(
            "{}: floating-point WAV data",
            path.display()
        )));
    }
    let width = width_from_bits(spec.bits_per_sample)?;

    let samples = reader
        .into_samples::<i32>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let buffer = SampleBuffer::new(samples, spec.sample_rate, width, usize::from(spec.channels))?;
    tracing::debug!(
        path = %path.display(),
        frames = buffer.frames(),
        channels = buffer.channels(),
        sample_rate = buffer.sample_rate(),
        bits = spec.bits_per_sample,
        "read wav"
    );
    Ok(buffer)
}

/// Write a [`SampleBuffer`] as integer PCM WAV.
///
/// Missing parent directories are created.
///
/// # Example
/// ```ignore
/// let tone = SampleBuffer::from_sine(1.0, 440.0, None, 48000, SampleWidth::Int16, 2)?;
/// write_wav("out/tone.wav", &tone)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &SampleBuffer) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let channels = u16::try_from(buffer.channels()).map_err(|_| {
        Error::UnsupportedFormat(format!("{} channels exceed the WAV limit", buffer.channels()))
    })?;
    let spec = hound::WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: buffer.width().bits(),
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    tracing::debug!(
        path = %path.display(),
        frames = buffer.frames(),
        channels = buffer.channels(),
        bits = spec.bits_per_sample,
        "wrote wav"
    );
    Ok(())
}

fn width_from_bits(bits: u16) -> Result<SampleWidth> {
    if bits % 8 != 0 {
        return Err(Error::UnsupportedFormat(format!("{bits}-bit samples")));
    }
    SampleWidth::from_bytes(usize::from(bits / 8))
        .map_err(|_| Error::UnsupportedFormat(format!("{bits}-bit samples")))
}
