//! Loads generated CSV files into JSON-ready rows.

use chrono::{DateTime, Utc};
use procsim_core::{parse_timestamp, TIMESTAMP_COLUMN};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::path::Path;
use thiserror::Error;

/// Error type for data loading operations.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Rows of a process data file.
///
/// Serializes as a JSON array of objects whose keys follow the file's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessData {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ProcessData {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps the `count` most recent rows, ordered oldest to newest.
    ///
    /// Rows are ordered by their parsed timestamp; the sort is stable and rows
    /// whose timestamp does not parse sort first.
    pub fn latest(self, count: usize) -> Self {
        let ts_idx = self.columns.iter().position(|c| c == TIMESTAMP_COLUMN);

        let mut keyed: Vec<(Option<DateTime<Utc>>, Vec<Value>)> = self
            .rows
            .into_iter()
            .map(|row| {
                let key = ts_idx
                    .and_then(|idx| row.get(idx))
                    .and_then(Value::as_str)
                    .and_then(|s| parse_timestamp(s).ok());
                (key, row)
            })
            .collect();
        keyed.sort_by_key(|(key, _)| *key);

        let skip = keyed.len().saturating_sub(count);
        Self {
            columns: self.columns,
            rows: keyed.into_iter().skip(skip).map(|(_, row)| row).collect(),
        }
    }
}

impl Serialize for ProcessData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView {
                columns: &self.columns,
                values: row,
            })?;
        }
        seq.end()
    }
}

struct RowView<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Reads a process data CSV file.
///
/// Numeric cells become JSON numbers, empty cells `null`; the timestamp column and
/// any other text stay strings.
pub fn load_process_data(path: &Path) -> Result<ProcessData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(std::io::BufReader::new(file));

    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = record
            .iter()
            .zip(&columns)
            .map(|(cell, column)| convert_cell(column, cell))
            .collect();
        rows.push(row);
    }

    Ok(ProcessData { columns, rows })
}

fn convert_cell(column: &str, cell: &str) -> Value {
    if column == TIMESTAMP_COLUMN {
        return Value::String(cell.to_string());
    }
    if cell.trim().is_empty() {
        return Value::Null;
    }
    cell.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}
