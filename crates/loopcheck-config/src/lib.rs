//! Scenario configuration for loopcheck runs.
//!
//! A [`Scenario`] describes one loopback check in TOML: the synthesized test
//! signal, the chain of distortions that turns it into a simulated capture,
//! and the evaluator settings.
//!
//! # Example
//!
//! ```rust,no_run
//! use loopcheck_config::{DistortionConfig, Scenario};
//!
//! // Load a scenario from file
//! let scenario = Scenario::load("scenario.toml").unwrap();
//!
//! // Or build one programmatically
//! let scenario = Scenario::new("noisy")
//!     .with_distortion(DistortionConfig::GaussianNoise { std_dev: 500.0, seed: Some(1) })
//!     .with_distortion(DistortionConfig::LowPass { cutoff: 8000.0 });
//!
//! scenario.save("scenarios/noisy.toml").unwrap();
//! ```

mod error;
mod scenario;

pub use error::ConfigError;
pub use scenario::{DistortionConfig, EvaluationConfig, Scenario, SignalConfig};
