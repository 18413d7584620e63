//! procsim Core - Core types for the chemical process data simulator
//!
//! This crate provides the data model shared by the generator and the data API:
//! - `ParameterDefinition`: one simulated process variable and its distributions
//! - `AnomalyRange`: the out-of-distribution interval anomalies are drawn from
//! - `ObservationRecord`: one timestamped row with a value per parameter
//! - `Series`: an ordered, timestamp-ascending sequence of records
//! - Timestamp encoding helpers (`format_timestamp`, `parse_timestamp`)

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::*;
