//! Core data types for the process data simulator

use crate::error::{CoreError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Name of the leading column in every generated file
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Number of decimal places kept on generated values
pub const VALUE_DECIMALS: i32 = 3;

/// Width of the normal band, in standard deviations either side of the mean
pub const NORMAL_BAND_SIGMAS: f64 = 3.0;

/// Encodes a timestamp as ISO-8601 with millisecond precision and a `Z` suffix,
/// e.g. `2024-03-01T12:00:05.000Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidTimestamp(format!("{value}: {e}")))
}

/// Rounds a value to `VALUE_DECIMALS` decimal places.
pub fn round_value(value: f64) -> f64 {
    let scale = 10f64.powi(VALUE_DECIMALS);
    (value * scale).round() / scale
}

/// Out-of-distribution interval that anomaly candidates are drawn from.
///
/// Candidates are sampled uniformly from `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRange {
    pub low: f64,
    pub high: f64,
}

impl AnomalyRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    fn is_valid(&self) -> bool {
        self.low.is_finite()
            && self.high.is_finite()
            && self.low < self.high
            && (self.high - self.low).is_finite()
    }
}

/// One simulated process variable (e.g. Temperature).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Column name in the generated file
    pub name: String,

    /// Nominal value
    pub mean: f64,

    /// Dispersion of the normal distribution
    #[serde(rename = "std")]
    pub std_dev: f64,

    /// Interval anomalies are drawn from
    pub anomaly_range: AnomalyRange,

    /// Display unit, not used in computation
    #[serde(default)]
    pub unit: String,
}

impl ParameterDefinition {
    /// Create a new parameter definition without a unit
    pub fn new(name: impl Into<String>, mean: f64, std_dev: f64, anomaly_range: AnomalyRange) -> Self {
        Self {
            name: name.into(),
            mean,
            std_dev,
            anomaly_range,
            unit: String::new(),
        }
    }

    /// Set the display unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Returns `(mean - 3·std, mean + 3·std)`.
    pub fn normal_band(&self) -> (f64, f64) {
        let half_width = NORMAL_BAND_SIGMAS * self.std_dev;
        (self.mean - half_width, self.mean + half_width)
    }

    /// Whether a value lies strictly outside the normal band.
    pub fn is_clearly_anomalous(&self, value: f64) -> bool {
        let (lower, upper) = self.normal_band();
        value < lower || value > upper
    }

    /// Whether any part of the anomaly range falls inside the normal band.
    ///
    /// Candidates landing in the overlap are rejected at generation time.
    pub fn anomaly_range_overlaps_normal_band(&self) -> bool {
        let (lower, upper) = self.normal_band();
        self.anomaly_range.low <= upper && self.anomaly_range.high >= lower
    }

    /// Validate the definition
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CoreError::EmptyParameterName);
        }
        if self.name == TIMESTAMP_COLUMN {
            return Err(CoreError::ReservedParameterName(self.name.clone()));
        }
        if !self.mean.is_finite() {
            return Err(CoreError::InvalidMean {
                name: self.name.clone(),
                mean: self.mean,
            });
        }
        if !self.std_dev.is_finite() || self.std_dev <= 0.0 {
            return Err(CoreError::InvalidStdDev {
                name: self.name.clone(),
                std_dev: self.std_dev,
            });
        }
        if !self.anomaly_range.is_valid() {
            return Err(CoreError::InvalidAnomalyRange {
                name: self.name.clone(),
                low: self.anomaly_range.low,
                high: self.anomaly_range.high,
            });
        }
        Ok(())
    }
}

/// One timestamped row with a value per configured parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub timestamp: DateTime<Utc>,
    /// Values in parameter configuration order
    pub values: Vec<f64>,
}

impl ObservationRecord {
    pub fn new(timestamp: DateTime<Utc>, values: Vec<f64>) -> Self {
        Self { timestamp, values }
    }

    /// Timestamp in its file encoding
    pub fn timestamp_string(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

/// An ordered sequence of observation records, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    parameters: Vec<String>,
    records: Vec<ObservationRecord>,
}

impl Series {
    /// Create an empty series for the given parameter columns
    pub fn new(parameters: Vec<String>) -> Self {
        Self::with_capacity(parameters, 0)
    }

    pub fn with_capacity(parameters: Vec<String>, capacity: usize) -> Self {
        Self {
            parameters,
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record.
    ///
    /// The record must carry one value per parameter and a timestamp strictly
    /// after the last record's.
    pub fn push(&mut self, record: ObservationRecord) -> Result<()> {
        if record.values.len() != self.parameters.len() {
            return Err(CoreError::RecordWidthMismatch {
                expected: self.parameters.len(),
                actual: record.values.len(),
            });
        }
        if let Some(last) = self.records.last() {
            if record.timestamp <= last.timestamp {
                return Err(CoreError::OutOfOrder {
                    previous: last.timestamp_string(),
                    current: record.timestamp_string(),
                });
            }
        }
        self.records.push(record);
        Ok(())
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&ObservationRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&ObservationRecord> {
        self.records.last()
    }

    /// Header row: `timestamp` followed by the parameter names
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(TIMESTAMP_COLUMN)
            .chain(self.parameters.iter().map(String::as_str))
            .collect()
    }

    /// All values of one parameter, in timestamp order
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.parameters.iter().position(|p| p == name)?;
        Some(self.records.iter().map(|r| r.values[idx]).collect())
    }

    pub fn into_records(self) -> Vec<ObservationRecord> {
        self.records
    }
}
