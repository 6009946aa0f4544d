//! Loading monitor parameters from configuration files and the environment.
//!
//! ```toml
//! [frequency.camera]
//! min = 10.0
//! max = 20.0
//! tolerance = 0.1
//! window_size = 5
//!
//! [timestamp.imu]
//! min_acceptable = -1.0
//! max_acceptable = 5.0
//! ```
//!
//! Environment variables prefixed with `PULSEWATCH` override file values,
//! with `__` separating path segments, e.g.
//! `PULSEWATCH__FREQUENCY__CAMERA__MIN=12`.

use std::collections::BTreeMap;
use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

use crate::error::{MonitorError, Result};
use crate::frequency::{
    FrequencyBound, FrequencyMonitor, FrequencyParams, DEFAULT_TOLERANCE, DEFAULT_WINDOW_SIZE,
};
use crate::task::DiagnosticTask;
use crate::timestamp::{
    DriftMonitor, TimestampParams, DEFAULT_MAX_ACCEPTABLE, DEFAULT_MIN_ACCEPTABLE,
};

const ENV_PREFIX: &str = "PULSEWATCH";

/// Settings for one rate monitor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrequencySettings {
    /// Minimum required rate (Hz).
    pub min: f64,
    /// Maximum allowed rate (Hz).
    #[serde(default)]
    pub max: Option<f64>,
    /// Fraction by which the bounds are widened.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Number of report intervals in the window.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

impl FrequencySettings {
    /// Convert into monitor parameters.
    pub fn params(&self) -> FrequencyParams {
        FrequencyParams::new(FrequencyBound {
            min: self.min,
            max: self.max,
        })
        .tolerance(self.tolerance)
        .window_size(self.window_size)
    }
}

/// Settings for one drift monitor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimestampSettings {
    /// Earliest acceptable delay (seconds).
    #[serde(default = "default_min_acceptable")]
    pub min_acceptable: f64,
    /// Latest acceptable delay (seconds).
    #[serde(default = "default_max_acceptable")]
    pub max_acceptable: f64,
}

impl TimestampSettings {
    /// Convert into monitor parameters.
    pub fn params(&self) -> TimestampParams {
        TimestampParams::new(self.min_acceptable, self.max_acceptable)
    }
}

impl Default for TimestampSettings {
    fn default() -> Self {
        Self {
            min_acceptable: DEFAULT_MIN_ACCEPTABLE,
            max_acceptable: DEFAULT_MAX_ACCEPTABLE,
        }
    }
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_min_acceptable() -> f64 {
    DEFAULT_MIN_ACCEPTABLE
}

fn default_max_acceptable() -> f64 {
    DEFAULT_MAX_ACCEPTABLE
}

/// Named monitor settings, keyed by task name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonitorConfig {
    /// Rate monitors.
    #[serde(default)]
    pub frequency: BTreeMap<String, FrequencySettings>,
    /// Drift monitors.
    #[serde(default)]
    pub timestamp: BTreeMap<String, TimestampSettings>,
}

impl MonitorConfig {
    /// Load from a file, then apply `PULSEWATCH__*` environment overrides.
    ///
    /// The format is inferred from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        info!(
            path = %path.display(),
            frequency = config.frequency.len(),
            timestamp = config.timestamp.len(),
            "loaded monitor configuration"
        );
        Ok(config)
    }

    /// Parse TOML text without consulting the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Build the named rate monitor.
    pub fn frequency_monitor(&self, name: &str) -> Result<FrequencyMonitor> {
        let settings = self
            .frequency
            .get(name)
            .ok_or_else(|| MonitorError::UnknownMonitor(name.to_string()))?;
        Ok(FrequencyMonitor::new(settings.params())?.named(name))
    }

    /// Build the named drift monitor.
    pub fn drift_monitor(&self, name: &str) -> Result<DriftMonitor> {
        let settings = self
            .timestamp
            .get(name)
            .ok_or_else(|| MonitorError::UnknownMonitor(name.to_string()))?;
        Ok(DriftMonitor::new(settings.params())?.named(name))
    }

    /// Build every configured monitor, rate monitors first.
    ///
    /// Fails on the first monitor with invalid parameters.
    pub fn build_tasks(&self) -> Result<Vec<Box<dyn DiagnosticTask>>> {
        let mut tasks: Vec<Box<dyn DiagnosticTask>> = Vec::new();
        for name in self.frequency.keys() {
            tasks.push(Box::new(self.frequency_monitor(name)?));
        }
        for name in self.timestamp.keys() {
            tasks.push(Box::new(self.drift_monitor(name)?));
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [frequency.camera]
        min = 10.0
        max = 20.0
        tolerance = 0.0

        [frequency.lidar]
        min = 5.0
        window_size = 2

        [timestamp.imu]
        max_acceptable = 0.5
    "#;

    #[test]
    fn parses_named_sections() {
        let config = MonitorConfig::from_toml_str(SAMPLE).unwrap();

        let camera = &config.frequency["camera"];
        assert_eq!(camera.min, 10.0);
        assert_eq!(camera.max, Some(20.0));
        assert_eq!(camera.tolerance, 0.0);
        assert_eq!(camera.window_size, DEFAULT_WINDOW_SIZE);

        let lidar = &config.frequency["lidar"];
        assert_eq!(lidar.max, None);
        assert_eq!(lidar.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(lidar.window_size, 2);

        let imu = &config.timestamp["imu"];
        assert_eq!(imu.min_acceptable, DEFAULT_MIN_ACCEPTABLE);
        assert_eq!(imu.max_acceptable, 0.5);
    }

    #[test]
    fn builds_named_monitors() {
        let config = MonitorConfig::from_toml_str(SAMPLE).unwrap();

        let camera = config.frequency_monitor("camera").unwrap();
        assert_eq!(camera.name(), "camera");
        assert_eq!(camera.params().bound.get(), FrequencyBound::range(10.0, 20.0));

        let imu = config.drift_monitor("imu").unwrap();
        assert_eq!(imu.name(), "imu");
        assert_eq!(imu.params().max_acceptable, 0.5);
    }

    #[test]
    fn build_tasks_orders_rate_monitors_first() {
        let config = MonitorConfig::from_toml_str(SAMPLE).unwrap();
        let tasks = config.build_tasks().unwrap();

        let names: Vec<&str> = tasks.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["camera", "lidar", "imu"]);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let config = MonitorConfig::from_toml_str(SAMPLE).unwrap();
        assert!(matches!(
            config.frequency_monitor("radar"),
            Err(MonitorError::UnknownMonitor(name)) if name == "radar"
        ));
        assert!(matches!(
            config.drift_monitor("camera"),
            Err(MonitorError::UnknownMonitor(_))
        ));
    }

    #[test]
    fn invalid_settings_fail_at_build() {
        let config = MonitorConfig::from_toml_str(
            r#"
            [frequency.broken]
            min = 1.0
            window_size = 0
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.build_tasks(),
            Err(MonitorError::InvalidWindowSize(0))
        ));
    }

    #[test]
    fn missing_min_fails_to_parse() {
        let result = MonitorConfig::from_toml_str(
            r#"
            [frequency.camera]
            max = 3.0
            "#,
        );
        assert!(matches!(result, Err(MonitorError::Load(_))));
    }

    #[test]
    fn empty_config_has_no_tasks() {
        let config = MonitorConfig::from_toml_str("").unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert!(config.build_tasks().unwrap().is_empty());
    }
}
