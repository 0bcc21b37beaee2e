//! Probe configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::timer::Resolution;

pub const SAMPLE_RATE_ENV: &str = "FEMUR_SAMPLE_RATE";
pub const RESOLUTION_ENV: &str = "FEMUR_RESOLUTION";

/// How often calls are timed and which unit durations are reported in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Probability (0.0-1.0) that a call is timed
    pub sample_rate: f64,
    /// Unit handed to the reporter
    pub resolution: Resolution,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1.0,
            resolution: Resolution::Milliseconds,
        }
    }
}

impl ProbeConfig {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ProbeConfig::from_env`] but reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(rate) = lookup(SAMPLE_RATE_ENV) {
            match rate.trim().parse::<f64>() {
                Ok(rate) if !rate.is_nan() => config.sample_rate = rate.clamp(0.0, 1.0),
                _ => warn!(value = %rate, "ignoring {SAMPLE_RATE_ENV}: not a number"),
            }
        }

        if let Some(resolution) = lookup(RESOLUTION_ENV) {
            match resolution.trim().parse::<Resolution>() {
                Ok(resolution) => config.resolution = resolution,
                Err(err) => warn!(%err, "ignoring {RESOLUTION_ENV}"),
            }
        }

        config
    }
}
