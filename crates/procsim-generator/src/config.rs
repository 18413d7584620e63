//! Configuration for the process data generator.

use crate::error::Result;
use chrono::TimeDelta;
use procsim_core::{AnomalyRange, CoreError, ParameterDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Smallest interval that still yields distinct millisecond timestamps
pub const MIN_INTERVAL_SECS: f64 = 0.001;

/// Main configuration for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of records to generate
    pub point_count: usize,

    /// Destination CSV file
    pub output_file: PathBuf,

    /// Parameters in column order
    pub parameters: Vec<ParameterDefinition>,

    /// Chance per record and parameter that an anomaly candidate is drawn
    pub anomaly_probability: f64,

    /// Spacing between consecutive records, in seconds
    pub interval_secs: f64,

    /// RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,

    /// Rows shown at each end of the preview after a run
    pub preview_rows: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            point_count: 5000,
            output_file: PathBuf::from("data/process_data.csv"),
            parameters: default_parameters(),
            anomaly_probability: 0.02,
            interval_secs: 5.0,
            seed: None,
            preview_rows: 5,
        }
    }
}

/// The five monitored variables of the simulated reactor.
pub fn default_parameters() -> Vec<ParameterDefinition> {
    vec![
        ParameterDefinition::new("Temperature", 150.0, 5.0, AnomalyRange::new(165.0, 175.0))
            .with_unit("°C"),
        ParameterDefinition::new("Pressure", 5.0, 0.5, AnomalyRange::new(6.5, 7.5)).with_unit("Bar"),
        ParameterDefinition::new("Flow_Rate", 100.0, 10.0, AnomalyRange::new(125.0, 135.0))
            .with_unit("L/min"),
        ParameterDefinition::new("pH_Value", 7.0, 0.2, AnomalyRange::new(5.0, 6.0)),
        ParameterDefinition::new("Concentration", 0.15, 0.01, AnomalyRange::new(0.20, 0.22))
            .with_unit("mol/L"),
    ]
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: GeneratorConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write default config to a file (for generating example config)
    pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(&Self::default())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parameter names in column order
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }

    /// Interval between records at nanosecond resolution
    pub fn interval(&self) -> TimeDelta {
        TimeDelta::nanoseconds((self.interval_secs * 1e9).round() as i64)
    }

    /// Total time covered by the series (`point_count × interval`)
    pub fn span(&self) -> procsim_core::Result<TimeDelta> {
        self.interval()
            .num_nanoseconds()
            .and_then(|step| step.checked_mul(i64::try_from(self.point_count).ok()?))
            .map(TimeDelta::nanoseconds)
            .ok_or(CoreError::SpanOverflow {
                points: self.point_count,
                interval_secs: self.interval_secs,
            })
    }

    /// Checks the configuration before any sample is drawn.
    ///
    /// Anomaly ranges overlapping the normal band are allowed; candidates that land
    /// inside the band are rejected per sample.
    pub fn validate(&self) -> procsim_core::Result<()> {
        if self.point_count == 0 {
            return Err(CoreError::InvalidPointCount(self.point_count));
        }
        if !self.interval_secs.is_finite()
            || self.interval_secs < MIN_INTERVAL_SECS
            || self.interval_secs * 1e9 >= i64::MAX as f64
        {
            return Err(CoreError::InvalidInterval(self.interval_secs));
        }
        if !(0.0..=1.0).contains(&self.anomaly_probability) {
            return Err(CoreError::InvalidProbability(self.anomaly_probability));
        }
        if self.parameters.is_empty() {
            return Err(CoreError::NoParameters);
        }

        let mut seen = HashSet::with_capacity(self.parameters.len());
        for param in &self.parameters {
            param.validate()?;
            if !seen.insert(param.name.as_str()) {
                return Err(CoreError::DuplicateParameter(param.name.clone()));
            }
            if param.anomaly_range_overlaps_normal_band() {
                let (lower, upper) = param.normal_band();
                warn!(
                    "Anomaly range of {} ({}, {}) overlaps its normal band [{}, {}]",
                    param.name, param.anomaly_range.low, param.anomaly_range.high, lower, upper
                );
            }
        }

        self.span()?;
        Ok(())
    }
}
