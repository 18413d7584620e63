//! CLI entry point for the process data generator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use procsim_generator::{
    render_preview, write_series, GeneratorConfig, Report, SeriesGenerator,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "procsim-generate")]
#[command(about = "Generate simulated chemical process data with injected anomalies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a series and write it as CSV
    Generate {
        /// YAML configuration file (command line options override it)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of data points to generate
        #[arg(short = 'n', long)]
        points: Option<usize>,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chance per point and parameter of an anomaly candidate (0.0 - 1.0)
        #[arg(short, long)]
        anomaly_probability: Option<f64>,

        /// Seconds between data points
        #[arg(short, long)]
        interval: Option<f64>,

        /// RNG seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Rows shown at each end of the preview (0 disables it)
        #[arg(short, long)]
        preview: Option<usize>,

        /// Also write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write the default configuration as YAML
    InitConfig {
        /// Destination file
        #[arg(default_value = "procsim.yml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            points,
            output,
            anomaly_probability,
            interval,
            seed,
            preview,
            report,
        } => {
            let mut config = match config {
                Some(path) => {
                    let loaded = GeneratorConfig::from_file(&path)
                        .with_context(|| format!("Failed to load {}", path.display()))?;
                    info!("Loaded configuration from: {}", path.display());
                    loaded
                }
                None => GeneratorConfig::default(),
            };

            // Apply command line overrides
            if let Some(points) = points {
                config.point_count = points;
            }
            if let Some(output) = output {
                config.output_file = output;
            }
            if let Some(p) = anomaly_probability {
                config.anomaly_probability = p;
            }
            if let Some(interval) = interval {
                config.interval_secs = interval;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(rows) = preview {
                config.preview_rows = rows;
            }

            generate(&config, report)
        }

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            GeneratorConfig::write_default(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Generated default configuration: {}", path.display());
            Ok(())
        }
    }
}

fn generate(config: &GeneratorConfig, report_path: Option<PathBuf>) -> Result<()> {
    info!("Generating simulated chemical process data...");
    let mut generator = SeriesGenerator::with_seed(config.seed);
    let generation = generator.generate(config).context("Invalid configuration")?;

    let summary = write_series(&generation.series, &config.output_file)
        .with_context(|| format!("Failed to write {}", config.output_file.display()))?;
    info!(
        "Data generation complete. {} data points saved to {}",
        summary.rows,
        summary.path.display()
    );

    let report = Report::new(config, &generation, Some(summary.path));
    report.print_summary();

    if config.preview_rows > 0 {
        println!("\n{}", render_preview(&generation.series, config.preview_rows));
    }

    if let Some(path) = report_path {
        std::fs::write(&path, report.to_json())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("JSON report saved to: {}", path.display());
    }

    Ok(())
}
