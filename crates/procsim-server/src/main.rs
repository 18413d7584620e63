//! procsim Server - serves generated process data over HTTP
//!
//! Usage:
//!   procsim-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>      Configuration file (default: procsim-server.yml)
//!   --data-file <PATH>   CSV file to serve (overrides config)
//!   --port <PORT>        HTTP port (overrides config, also read from PORT)
//!   --host <HOST>        Bind address (overrides config)

use anyhow::Context;
use clap::Parser;
use procsim_api::{create_router, AppState};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG_FILE: &str = "procsim-server.yml";

/// Complete server configuration - can be loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server configuration
    pub server: ServerSettings,
    /// Data source configuration
    pub data: DataSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Server network settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            request_timeout_secs: 30,
        }
    }
}

/// Data source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// CSV file written by procsim-generate
    pub file: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("data/process_data.csv"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Include target in logs
    pub show_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ServerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write default config to a file (for generating example config)
    pub fn write_default(path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(&Self::default())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Get log level
    pub fn log_level(&self) -> Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Apply command line overrides
    fn apply(&mut self, args: &CliArgs) {
        if let Some(data_file) = &args.data_file {
            self.data.file = data_file.clone();
        }
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "procsim-server")]
#[command(about = "Serve generated process data as JSON")]
#[command(version)]
struct CliArgs {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV file to serve
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Bind address
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// HTTP port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Generate default config file and exit
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Generate config and exit if requested
    if args.generate_config {
        let path = args.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        ServerConfig::write_default(&path)?;
        println!("Generated default configuration: {}", path.display());
        return Ok(());
    }

    // Load configuration
    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = if config_path.exists() {
        match ServerConfig::from_file(&config_path) {
            Ok(c) => {
                println!("Loaded configuration from: {}", config_path.display());
                c
            }
            Err(e) => {
                eprintln!("Warning: Failed to load {}: {}", config_path.display(), e);
                eprintln!("Using default configuration");
                ServerConfig::default()
            }
        }
    } else {
        ServerConfig::default()
    };
    config.apply(&args);

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_target(config.logging.show_target)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting procsim-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Data file: {}", config.data.file.display());
    if !config.data.file.is_file() {
        tracing::warn!(
            "Data file {} does not exist yet; run procsim-generate first",
            config.data.file.display()
        );
    }

    let state = Arc::new(AppState::new(config.data.file.clone()));
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let app = create_router(state, request_timeout);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.host, config.server.port))?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server running on port {}", config.server.port);
    info!("Access API at http://{}", addr);
    info!("Data endpoint: GET http://{}/api/data", addr);
    info!("Latest endpoint: GET http://{}/api/data/latest/{{count}}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("SIGINT received, shutting down gracefully...");
        }
        _ = terminate => {
            info!("SIGTERM received, shutting down gracefully...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.data.file, PathBuf::from("data/process_data.csv"));
        assert_eq!(config.log_level(), Level::INFO);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        ServerConfig::write_default(&path).unwrap();
        assert_eq!(ServerConfig::from_file(&path).unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_partial_yaml_and_overrides() {
        let mut config: ServerConfig = serde_yaml::from_str(
            "server:\n  port: 8080\nlogging:\n  level: DEBUG\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.log_level(), Level::DEBUG);

        let args = CliArgs::parse_from([
            "procsim-server",
            "--data-file",
            "/tmp/run.csv",
            "--port",
            "9000",
        ]);
        config.apply(&args);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.data.file, PathBuf::from("/tmp/run.csv"));
    }
}
