//! procsim API - read-only HTTP API over generated process data
//!
//! This crate provides:
//! - CSV loading with numeric cell conversion
//! - `GET /api/data` and `GET /api/data/latest/{count}` JSON endpoints
//! - Root and health endpoints
//!
//! The data file is re-read on every request, so a regenerated file is served
//! without a restart.

pub mod error;
pub mod handlers;
pub mod loader;
pub mod router;

pub use error::{ApiError, Result};
pub use handlers::AppState;
pub use loader::{load_process_data, LoadError, ProcessData};
pub use router::create_router;
