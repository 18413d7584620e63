//! CSV writer for generated series.

use crate::error::{GeneratorError, Result};
use procsim_core::Series;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of writing a series to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    /// Directory created to hold the file, if it did not exist
    pub created_dir: Option<PathBuf>,
}

/// Creates the parent directory of `path` when missing.
///
/// Returns the directory if it had to be created.
pub fn ensure_parent_dir(path: &Path) -> Result<Option<PathBuf>> {
    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(None);
    };
    if dir.is_dir() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir).map_err(|source| GeneratorError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    info!("Created directory: {}", dir.display());
    Ok(Some(dir.to_path_buf()))
}

/// Writes a series to `path` as CSV, creating the parent directory first.
///
/// A failure part-way leaves a truncated file behind; the error is returned.
pub fn write_series(series: &Series, path: impl AsRef<Path>) -> Result<WriteSummary> {
    let path = path.as_ref();
    let created_dir = ensure_parent_dir(path)?;

    let file = File::create(path)?;
    write_series_to(series, BufWriter::new(file))?;

    Ok(WriteSummary {
        path: path.to_path_buf(),
        rows: series.len(),
        created_dir,
    })
}

/// Writes a series as CSV: a `timestamp` header column followed by the
/// parameters, one row per record.
pub fn write_series_to<W: Write>(series: &Series, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(series.header())?;

    let mut row = Vec::with_capacity(series.parameters().len() + 1);
    for record in series.records() {
        row.clear();
        row.push(record.timestamp_string());
        row.extend(record.values.iter().map(|&v| format_value(v)));
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

/// Formats a rounded value; whole numbers keep one decimal (`150.0`).
pub fn format_value(value: f64) -> String {
    // Normalise -0.0
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use procsim_core::ObservationRecord;
    use tempfile::TempDir;

    fn sample_series() -> Series {
        let mut series = Series::new(vec!["Temperature".to_string(), "pH_Value".to_string()]);
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        series
            .push(ObservationRecord::new(start, vec![150.123, 7.0]))
            .unwrap();
        series
            .push(ObservationRecord::new(
                start + chrono::TimeDelta::seconds(5),
                vec![171.5, 5.42],
            ))
            .unwrap();
        series
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(150.123), "150.123");
        assert_eq!(format_value(150.0), "150.0");
        assert_eq!(format_value(0.15), "0.15");
        assert_eq!(format_value(-0.0), "0.0");
        assert_eq!(format_value(-2.5), "-2.5");
    }

    #[test]
    fn test_write_series_to_buffer() {
        let mut buf = Vec::new();
        write_series_to(&sample_series(), &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "timestamp,Temperature,pH_Value",
                "2023-11-14T22:13:20.000Z,150.123,7.0",
                "2023-11-14T22:13:25.000Z,171.5,5.42",
            ]
        );
    }

    #[test]
    fn test_write_series_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data").join("process_data.csv");

        let summary = write_series(&sample_series(), &path).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.created_dir, Some(dir.path().join("nested").join("data")));

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);

        // Second write finds the directory in place
        let summary = write_series(&sample_series(), &path).unwrap();
        assert_eq!(summary.created_dir, None);
    }

    #[test]
    fn test_write_series_bare_file_name() {
        assert_eq!(ensure_parent_dir(Path::new("process_data.csv")).unwrap(), None);
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let dir = TempDir::new().unwrap();
        // The target is an existing directory, so the file cannot be created
        let err = write_series(&sample_series(), dir.path()).unwrap_err();
        assert!(matches!(err, GeneratorError::Io(_)));
    }

    #[test]
    fn test_parent_that_is_a_file_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write_series(&sample_series(), blocker.join("out.csv")).unwrap_err();
        assert!(matches!(err, GeneratorError::CreateDir { .. }));
    }
}
