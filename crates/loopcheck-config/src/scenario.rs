//! Scenario file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use loopcheck_core::{
    DEFAULT_NOISE_CHANNELS, DEFAULT_NOISE_DURATION_SAMPLES, FilterKind, SampleBuffer, SampleWidth,
    SignalGenerator, Transform,
};

use crate::error::ConfigError;

/// A complete loopback check: test signal, distortion chain, and evaluation settings.
///
/// # TOML Format
///
/// ```toml
/// name = "default"
///
/// [signal]
/// freqs = [100.0]
/// duration = 3.0
/// sample_rate = 48000
/// width = 4
/// channels = 2
///
/// [[distortions]]
/// type = "dc_offset"
/// offset = 2000.0
///
/// [[distortions]]
/// type = "pop_noise"
/// at_seconds = 1.0
///
/// [evaluation]
/// max_segment_len = 2048
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Name of the scenario.
    #[serde(default = "default_name")]
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Test signal to synthesize.
    #[serde(default)]
    pub signal: SignalConfig,

    /// Distortions applied in order to produce the recorded copy.
    #[serde(default)]
    pub distortions: Vec<DistortionConfig>,

    /// Evaluator settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

fn default_name() -> String {
    "default".to_string()
}

/// Synthesized test signal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalConfig {
    /// Tone frequencies in Hz; more than one produces an averaged multi-tone.
    pub freqs: Vec<f64>,
    /// Length in seconds.
    pub duration: f64,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bytes per sample (1, 2, 3, or 4).
    pub width: usize,
    /// Channel count.
    pub channels: usize,
    /// Peak amplitude in sample units; 90% of full scale when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude: Option<f64>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            freqs: vec![100.0],
            duration: 3.0,
            sample_rate: 48000,
            width: 4,
            channels: 2,
            amplitude: None,
        }
    }
}

impl SignalConfig {
    /// Synthesize the signal.
    pub fn generate(&self) -> loopcheck_core::Result<SampleBuffer> {
        let width = SampleWidth::from_bytes(self.width)?;
        let generator = SignalGenerator::new(self.sample_rate, width, self.channels)?;
        match self.freqs.as_slice() {
            [freq] => generator.sine(self.duration, *freq, self.amplitude),
            freqs => generator.multi_sine(self.duration, freqs, self.amplitude),
        }
    }
}

/// One step of the distortion chain.
///
/// `channels` lists default to channel 0 only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistortionConfig {
    /// Constant offset.
    DcOffset {
        /// Offset in sample units.
        offset: f64,
    },
    /// Gain with saturation.
    Clipping {
        /// Linear gain.
        gain: f64,
    },
    /// Impulsive burst.
    PopNoise {
        /// Burst start in seconds.
        at_seconds: f64,
        /// Affected channels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channels: Option<Vec<usize>>,
        /// Burst level; full scale when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<i64>,
        /// Burst length in frames.
        #[serde(default = "default_noise_duration")]
        duration_samples: usize,
    },
    /// Dropout that splices out frames.
    CutNoise {
        /// Cut position in seconds.
        at_seconds: f64,
        /// Affected channels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channels: Option<Vec<usize>>,
        /// Frames removed.
        #[serde(default = "default_noise_duration")]
        duration_samples: usize,
    },
    /// Additive Gaussian noise.
    #[serde(alias = "normalized_noise")]
    GaussianNoise {
        /// Standard deviation in sample units.
        std_dev: f64,
        /// Seed for reproducible noise.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
    /// Butterworth low-pass.
    LowPass {
        /// Cutoff in Hz.
        cutoff: f64,
    },
    /// Butterworth high-pass.
    HighPass {
        /// Cutoff in Hz.
        cutoff: f64,
    },
    /// Butterworth band-pass.
    BandPass {
        /// Lower edge in Hz.
        low: f64,
        /// Upper edge in Hz.
        high: f64,
    },
    /// Butterworth band-stop.
    BandStop {
        /// Lower edge in Hz.
        low: f64,
        /// Upper edge in Hz.
        high: f64,
    },
}

fn default_noise_duration() -> usize {
    DEFAULT_NOISE_DURATION_SAMPLES
}

impl DistortionConfig {
    /// Resolve into a transform, filling in default channels.
    pub fn to_transform(&self) -> Transform {
        let resolve = |channels: &Option<Vec<usize>>| {
            channels
                .clone()
                .unwrap_or_else(|| DEFAULT_NOISE_CHANNELS.to_vec())
        };
        match self {
            DistortionConfig::DcOffset { offset } => Transform::DcOffset { offset: *offset },
            DistortionConfig::Clipping { gain } => Transform::Clipping { gain: *gain },
            DistortionConfig::PopNoise {
                at_seconds,
                channels,
                level,
                duration_samples,
            } => Transform::PopNoise {
                at_seconds: *at_seconds,
                channels: resolve(channels),
                level: *level,
                duration_samples: *duration_samples,
            },
            DistortionConfig::CutNoise {
                at_seconds,
                channels,
                duration_samples,
            } => Transform::CutNoise {
                at_seconds: *at_seconds,
                channels: resolve(channels),
                duration_samples: *duration_samples,
            },
            DistortionConfig::GaussianNoise { std_dev, seed } => Transform::GaussianNoise {
                std_dev: *std_dev,
                seed: *seed,
            },
            DistortionConfig::LowPass { cutoff } => {
                Transform::Filter(FilterKind::LowPass { cutoff: *cutoff })
            }
            DistortionConfig::HighPass { cutoff } => {
                Transform::Filter(FilterKind::HighPass { cutoff: *cutoff })
            }
            DistortionConfig::BandPass { low, high } => Transform::Filter(FilterKind::BandPass {
                low: *low,
                high: *high,
            }),
            DistortionConfig::BandStop { low, high } => Transform::Filter(FilterKind::BandStop {
                low: *low,
                high: *high,
            }),
        }
    }

    fn channels(&self) -> Option<&[usize]> {
        match self {
            DistortionConfig::PopNoise { channels, .. }
            | DistortionConfig::CutNoise { channels, .. } => channels.as_deref(),
            _ => None,
        }
    }

    fn cutoffs(&self) -> Vec<f64> {
        match self {
            DistortionConfig::LowPass { cutoff } | DistortionConfig::HighPass { cutoff } => {
                vec![*cutoff]
            }
            DistortionConfig::BandPass { low, high } | DistortionConfig::BandStop { low, high } => {
                vec![*low, *high]
            }
            _ => Vec::new(),
        }
    }
}

/// Evaluator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationConfig {
    /// Upper bound on the coherence segment length.
    #[serde(default = "default_max_segment_len")]
    pub max_segment_len: usize,
}

fn default_max_segment_len() -> usize {
    2048
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_segment_len: default_max_segment_len(),
        }
    }
}

impl Scenario {
    /// Create a scenario with the default signal and no distortions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            signal: SignalConfig::default(),
            distortions: Vec::new(),
            evaluation: EvaluationConfig::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the signal.
    pub fn with_signal(mut self, signal: SignalConfig) -> Self {
        self.signal = signal;
        self
    }

    /// Append a distortion.
    pub fn with_distortion(mut self, distortion: DistortionConfig) -> Self {
        self.distortions.push(distortion);
        self
    }

    /// Load a scenario from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a scenario from a TOML string and validate it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let scenario: Scenario = toml::from_str(toml_str)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Save the scenario to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the scenario to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let signal = &self.signal;
        if signal.freqs.is_empty() {
            return Err(ConfigError::invalid("signal.freqs must not be empty"));
        }
        if !(signal.duration.is_finite() && signal.duration > 0.0) {
            return Err(ConfigError::invalid(format!(
                "signal.duration must be positive, got {}",
                signal.duration
            )));
        }
        if signal.sample_rate == 0 {
            return Err(ConfigError::invalid("signal.sample_rate must be positive"));
        }
        if signal.channels == 0 {
            return Err(ConfigError::invalid("signal.channels must be positive"));
        }
        if !(1..=4).contains(&signal.width) {
            return Err(ConfigError::invalid(format!(
                "signal.width must be 1-4 bytes, got {}",
                signal.width
            )));
        }

        let nyquist = f64::from(signal.sample_rate) / 2.0;
        for (i, distortion) in self.distortions.iter().enumerate() {
            if let Some(&ch) = distortion
                .channels()
                .and_then(|chs| chs.iter().find(|&&ch| ch >= signal.channels))
            {
                return Err(ConfigError::invalid(format!(
                    "distortions[{i}]: channel {ch} out of range for {} channels",
                    signal.channels
                )));
            }
            let cutoffs = distortion.cutoffs();
            if let Some(f) = cutoffs.iter().find(|&&f| !(f > 0.0 && f < nyquist)) {
                return Err(ConfigError::invalid(format!(
                    "distortions[{i}]: cutoff {f} Hz must lie between 0 and {nyquist} Hz"
                )));
            }
            if let [low, high] = cutoffs.as_slice()
                && low >= high
            {
                return Err(ConfigError::invalid(format!(
                    "distortions[{i}]: band edges must satisfy low < high"
                )));
            }
        }

        if self.evaluation.max_segment_len == 0 {
            return Err(ConfigError::invalid(
                "evaluation.max_segment_len must be positive",
            ));
        }
        Ok(())
    }

    /// The distortion chain as transforms, in order.
    pub fn transforms(&self) -> Vec<Transform> {
        self.distortions
            .iter()
            .map(DistortionConfig::to_transform)
            .collect()
    }

    /// Synthesize the original buffer.
    pub fn original(&self) -> loopcheck_core::Result<SampleBuffer> {
        self.signal.generate()
    }

    /// Apply the distortion chain to a copy of `original`.
    pub fn distort(&self, original: &SampleBuffer) -> loopcheck_core::Result<SampleBuffer> {
        let mut recorded = original.copy();
        for transform in self.transforms() {
            recorded.apply(&transform)?;
        }
        Ok(recorded)
    }
}

impl Default for Scenario {
    /// 3 s of 100 Hz at 48 kHz, 32-bit stereo, with a 2000 DC offset and a
    /// full-scale pop on channel 0 at 1 s.
    fn default() -> Self {
        Self::new("default")
            .with_description("100 Hz sine with DC offset and a pop at 1 s")
            .with_distortion(DistortionConfig::DcOffset { offset: 2000.0 })
            .with_distortion(DistortionConfig::PopNoise {
                at_seconds: 1.0,
                channels: None,
                level: None,
                duration_samples: DEFAULT_NOISE_DURATION_SAMPLES,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_capture_scenario() {
        let scenario = Scenario::default();
        assert_eq!(scenario.signal.freqs, vec![100.0]);
        assert_eq!(scenario.signal.sample_rate, 48000);
        assert_eq!(scenario.signal.width, 4);
        assert_eq!(scenario.signal.channels, 2);
        assert_eq!(scenario.distortions.len(), 2);
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let scenario = Scenario::default()
            .with_distortion(DistortionConfig::GaussianNoise {
                std_dev: 100.0,
                seed: Some(3),
            })
            .with_distortion(DistortionConfig::BandPass {
                low: 50.0,
                high: 500.0,
            });
        let toml_str = scenario.to_toml().unwrap();
        let parsed = Scenario::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, scenario);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let scenario = Scenario::from_toml(
            r#"
            [[distortions]]
            type = "normalized_noise"
            std_dev = 50.0
            "#,
        )
        .unwrap();
        assert_eq!(scenario.name, "default");
        assert_eq!(scenario.signal, SignalConfig::default());
        assert_eq!(scenario.evaluation.max_segment_len, 2048);
        assert_eq!(
            scenario.distortions,
            vec![DistortionConfig::GaussianNoise {
                std_dev: 50.0,
                seed: None
            }]
        );
    }

    #[test]
    fn test_channels_default_to_first() {
        let scenario = Scenario::default();
        match &scenario.transforms()[1] {
            Transform::PopNoise {
                channels,
                duration_samples,
                ..
            } => {
                assert_eq!(channels, &vec![0]);
                assert_eq!(*duration_samples, 5);
            }
            other => panic!("expected pop noise, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_errors() {
        let mut bad = Scenario::default();
        bad.signal.width = 5;
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));

        let bad = Scenario::default().with_distortion(DistortionConfig::CutNoise {
            at_seconds: 0.5,
            channels: Some(vec![2]),
            duration_samples: 5,
        });
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));

        let bad = Scenario::default().with_distortion(DistortionConfig::LowPass { cutoff: 24000.0 });
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));

        let bad = Scenario::default().with_distortion(DistortionConfig::BandStop {
            low: 900.0,
            high: 100.0,
        });
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            Scenario::from_toml("[signal]\nfreqs = []\nduration = 1.0\nsample_rate = 8000\nwidth = 2\nchannels = 1\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_distortion_is_parse_error() {
        let result = Scenario::from_toml("[[distortions]]\ntype = \"reverb\"\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_multi_tone_signal() {
        let signal = SignalConfig {
            freqs: vec![100.0, 200.0],
            duration: 0.1,
            sample_rate: 8000,
            width: 2,
            channels: 1,
            amplitude: Some(1000.0),
        };
        let buf = signal.generate().unwrap();
        assert_eq!(buf.frames(), 800);
        assert!(buf.samples().iter().all(|s| s.abs() <= 1000));
    }
}
