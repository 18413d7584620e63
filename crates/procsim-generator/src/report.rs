//! Run report and data preview.

use crate::config::GeneratorConfig;
use crate::generator::Generation;
use crate::writer::format_value;
use procsim_core::{format_timestamp, Series};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Value summary for one parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub anomalies_injected: u64,
    pub anomalies_rejected: u64,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub point_count: usize,
    pub interval_secs: f64,
    pub anomaly_probability: f64,
    pub seed: Option<u64>,
    pub output_file: Option<PathBuf>,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
    pub parameters: Vec<ParameterSummary>,
}

impl Report {
    /// Builds a report from a finished run.
    pub fn new(config: &GeneratorConfig, generation: &Generation, output_file: Option<PathBuf>) -> Self {
        let series = &generation.series;

        let parameters = config
            .parameters
            .iter()
            .map(|param| {
                let values = series.column(&param.name).unwrap_or_default();
                let stats = generation.stats.get(&param.name);
                let (min, max, mean) = summarize(&values);
                ParameterSummary {
                    name: param.name.clone(),
                    unit: param.unit.clone(),
                    min,
                    max,
                    mean,
                    anomalies_injected: stats.map_or(0, |s| s.anomalies_injected),
                    anomalies_rejected: stats.map_or(0, |s| s.anomalies_rejected),
                }
            })
            .collect();

        Self {
            point_count: series.len(),
            interval_secs: config.interval_secs,
            anomaly_probability: config.anomaly_probability,
            seed: config.seed,
            output_file,
            first_timestamp: series.first().map(|r| format_timestamp(&r.timestamp)),
            last_timestamp: series.last().map(|r| format_timestamp(&r.timestamp)),
            parameters,
        }
    }

    /// Generates a JSON report.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Prints a summary to stdout.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("GENERATION RESULTS");
        println!("{}", "=".repeat(60));

        println!(
            "\nPoints: {} | Interval: {}s | Anomaly probability: {}",
            format_number(self.point_count as u64),
            self.interval_secs,
            self.anomaly_probability
        );
        if let (Some(first), Some(last)) = (&self.first_timestamp, &self.last_timestamp) {
            println!("Span: {} .. {}", first, last);
        }
        if let Some(seed) = self.seed {
            println!("Seed: {}", seed);
        }
        if let Some(path) = &self.output_file {
            println!("Output: {}", path.display());
        }

        println!(
            "\n{:<16} {:>8} {:>12} {:>12} {:>12} {:>9} {:>9}",
            "Parameter", "Unit", "Min", "Mean", "Max", "Injected", "Rejected"
        );
        for p in &self.parameters {
            println!(
                "{:<16} {:>8} {:>12.3} {:>12.3} {:>12.3} {:>9} {:>9}",
                p.name, p.unit, p.min, p.mean, p.max, p.anomalies_injected, p.anomalies_rejected
            );
        }

        println!("\n{}", "=".repeat(60));
    }
}

/// Renders the first and last `rows` records as a text table.
///
/// When the series has no more than `2 × rows` records, every record is shown.
pub fn render_preview(series: &Series, rows: usize) -> String {
    let header = series.header();
    let records = series.records();

    let mut table: Vec<Vec<String>> = vec![header.iter().map(|h| h.to_string()).collect()];
    let mut gap_at = None;

    let to_row = |idx: usize| -> Vec<String> {
        let record = &records[idx];
        std::iter::once(record.timestamp_string())
            .chain(record.values.iter().map(|&v| format_value(v)))
            .collect()
    };

    if records.len() <= rows.saturating_mul(2) {
        table.extend((0..records.len()).map(to_row));
    } else {
        table.extend((0..rows).map(to_row));
        gap_at = Some(table.len());
        table.extend((records.len() - rows..records.len()).map(to_row));
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|col| table.iter().map(|row| row[col].len()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for (i, row) in table.iter().enumerate() {
        if gap_at == Some(i) {
            out.push_str("...\n");
        }
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:>w$}", cell, w = w))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn summarize(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (min, max, mean)
}

/// Formats a number with thousand separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
