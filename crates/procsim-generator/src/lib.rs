//! Simulated chemical process data generator.
//!
//! Synthesizes a fixed-size time series of process readings (temperature, pressure,
//! flow rate, pH, concentration), injects rare out-of-range anomaly values, and
//! writes the result as CSV.
//!
//! # Anomaly injection
//! For every record and parameter a value is drawn from the parameter's normal
//! distribution. With the configured probability an anomaly candidate is drawn
//! uniformly from the parameter's anomaly range instead; it is kept only when it
//! falls outside `mean ± 3·std`, otherwise one fresh normal draw replaces it.
//!
//! # Usage
//! ```bash
//! # Defaults: 5000 points every 5s into data/process_data.csv
//! procsim-generate generate
//!
//! # Reproducible run from a config file
//! procsim-generate generate --config procsim.yml --seed 42
//!
//! # Write the default config
//! procsim-generate init-config procsim.yml
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod report;
pub mod writer;

pub use config::{default_parameters, GeneratorConfig};
pub use error::{GeneratorError, Result};
pub use generator::{Generation, GenerationStats, ParameterStats, SeriesGenerator};
pub use report::{render_preview, Report};
pub use writer::{write_series, write_series_to, WriteSummary};
