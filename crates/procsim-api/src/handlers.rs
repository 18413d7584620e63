//! HTTP request handlers

use crate::error::{ApiError, Result};
use crate::loader::{load_process_data, ProcessData};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Application state shared across handlers
pub struct AppState {
    pub data_file: PathBuf,
    start_time: Instant,
}

impl AppState {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Reads the data file on the blocking pool.
    async fn read_data(&self) -> Result<ProcessData> {
        let path = self.data_file.clone();
        let result = tokio::task::spawn_blocking(move || load_process_data(&path))
            .await
            .map_err(|e| ApiError::Internal(format!("Data loading task failed: {}", e)))?;

        let data = result.map_err(|e| ApiError::DataUnavailable(e.to_string()))?;
        debug!("Loaded {} rows from {}", data.len(), self.data_file.display());
        Ok(data)
    }
}

/// Root handler
pub async fn root() -> &'static str {
    "Chemical Process Dashboard API is running!"
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub data_file: String,
    pub data_file_present: bool,
    pub uptime_seconds: u64,
}

/// Health check handler
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_file: state.data_file.display().to_string(),
        data_file_present: state.data_file.is_file(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// All rows of the data file
pub async fn all_data(State(state): State<Arc<AppState>>) -> Result<Json<ProcessData>> {
    state.read_data().await.map(Json).map_err(|e| {
        error!("Failed to retrieve process data: {}", e);
        ApiError::DataUnavailable("Error retrieving process data".to_string())
    })
}

/// The `count` most recent rows, oldest first
pub async fn latest_data(
    State(state): State<Arc<AppState>>,
    Path(count): Path<String>,
) -> Result<Json<ProcessData>> {
    let count = parse_count(&count)?;

    let data = state.read_data().await.map_err(|e| {
        error!("Failed to retrieve latest process data: {}", e);
        ApiError::DataUnavailable("Error retrieving latest process data".to_string())
    })?;

    Ok(Json(data.latest(count)))
}

/// Parses a strictly positive row count.
pub fn parse_count(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ApiError::BadRequest(
            "Invalid count parameter. Must be a positive integer.".to_string(),
        )),
    }
}
