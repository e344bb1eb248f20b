//! Tracker configuration.
//!
//! All values have working defaults. Layers apply in order: defaults, then an
//! optional JSON document, then `STRIDE_*` and logging environment overrides.
//! `from_layers` runs `validate` once, after every layer is in place.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::location::MapRegion;
use crate::logging::LoggingConfig;
use crate::progress::DailyGoal;
use crate::step_detection::StepDetectorConfig;
use crate::types::Coordinate;

pub const ENV_THRESHOLD: &str = "STRIDE_THRESHOLD";
pub const ENV_REFRACTORY_MS: &str = "STRIDE_REFRACTORY_MS";
pub const ENV_MIN_MAGNITUDE: &str = "STRIDE_MIN_MAGNITUDE";
pub const ENV_DAILY_GOAL: &str = "STRIDE_DAILY_GOAL";

/// Top-level configuration for the sensing core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub detector: StepDetectorConfig,
    pub daily_goal: DailyGoal,
    /// Map centre used when the user's position is unavailable.
    pub default_center: Coordinate,
    pub logging: LoggingConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detector: StepDetectorConfig::default(),
            daily_goal: DailyGoal::default(),
            default_center: crate::location::DEFAULT_CENTER,
            logging: LoggingConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_layers(Some(json), |_| None)
    }

    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_layers(None, |name| env::var(name).ok())
    }

    /// Optional JSON document, then overrides read through `lookup`, then
    /// validation of the combined result.
    pub fn from_layers<F>(json: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = match json {
            Some(json) => serde_json::from_str(json)?,
            None => Self::default(),
        };
        config.apply_env_with(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STRIDE_*` and logging overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_var(&lookup, ENV_THRESHOLD)? {
            self.detector.threshold = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_REFRACTORY_MS)? {
            self.detector.refractory_ms = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_MIN_MAGNITUDE)? {
            self.detector.min_magnitude = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_DAILY_GOAL)? {
            self.daily_goal = DailyGoal(value);
        }
        self.logging.apply_env_with(&lookup);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let detector = &self.detector;
        if !detector.threshold.is_finite() || detector.threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "detector.threshold must be positive, got {}",
                detector.threshold
            )));
        }
        if !detector.min_magnitude.is_finite() || detector.min_magnitude < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "detector.min_magnitude must be non-negative, got {}",
                detector.min_magnitude
            )));
        }
        if self.daily_goal.steps() == 0 {
            return Err(ConfigError::Invalid("daily_goal must be at least 1".into()));
        }
        let center = self.default_center;
        if !(-90.0..=90.0).contains(&center.latitude)
            || !(-180.0..=180.0).contains(&center.longitude)
        {
            return Err(ConfigError::Invalid(format!(
                "default_center out of range: {}, {}",
                center.latitude, center.longitude
            )));
        }
        Ok(())
    }

    pub fn default_region(&self) -> MapRegion {
        MapRegion::around(self.default_center)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { name, value: raw }),
        None => Ok(None),
    }
}
