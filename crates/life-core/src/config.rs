//! Configuration types for the demo.
//!
//! Every struct has sensible defaults and a `from_env` constructor that
//! overlays process environment variables on top of them. The `from_lookup`
//! variants take any key lookup so tests never touch the real environment.

use crate::{EdgePolicy, Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parse `key` with `lookup`, falling back to `default` when it is unset
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Simulation and snapshot parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Canvas width in pixels
    pub canvas_width: u32,
    /// Canvas height in pixels
    pub canvas_height: u32,
    /// Edge length of one cell in pixels
    pub cell_size: u32,
    /// Neighbor lookup policy at the grid edge
    pub edge_policy: EdgePolicy,
    /// Seed for the initial fill; random when unset
    pub seed: Option<u64>,
    /// Simulation tick period (milliseconds)
    pub tick_interval_ms: u64,
    /// Snapshot export period (milliseconds)
    pub export_interval_ms: u64,
    /// Export cycles after which the simulation restarts
    pub exports_before_reset: u32,
    /// File name given to exported snapshots
    pub snapshot_file_name: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 800,
            cell_size: 20,
            edge_policy: EdgePolicy::Bounded,
            seed: None,
            tick_interval_ms: 100,
            export_interval_ms: 10_000,
            exports_before_reset: 3,
            snapshot_file_name: "gameState.png".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            canvas_width: parse_or(&lookup, "LIFE_CANVAS_WIDTH", defaults.canvas_width)?,
            canvas_height: parse_or(&lookup, "LIFE_CANVAS_HEIGHT", defaults.canvas_height)?,
            cell_size: parse_or(&lookup, "LIFE_CELL_SIZE", defaults.cell_size)?,
            edge_policy: parse_or(&lookup, "LIFE_EDGE_POLICY", defaults.edge_policy)?,
            seed: lookup("LIFE_SEED")
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map_err(|e| Error::InvalidConfig(format!("LIFE_SEED={:?}: {}", raw, e)))
                })
                .transpose()?,
            ..defaults
        };

        if config.cell_size == 0 {
            return Err(Error::InvalidConfig("LIFE_CELL_SIZE must be positive".to_string()));
        }
        // A snapshot needs at least one pixel on each axis
        if config.canvas_width == 0 || config.canvas_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "canvas must be at least 1x1 pixels, got {}x{}",
                config.canvas_width, config.canvas_height
            )));
        }

        Ok(config)
    }

    /// Cells per side: the number of whole cells that fit across the canvas
    pub fn grid_size(&self) -> usize {
        (self.canvas_width / self.cell_size) as usize
    }
}

/// Upload server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Directory served at `/`
    pub static_dir: String,
    /// Directory uploaded files are written to
    pub upload_dir: String,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
            upload_dir: "uploads".to_string(),
            otel_endpoint: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
            upload_dir: lookup("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            otel_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Simulation parameters
    pub simulation: SimulationConfig,
    /// Upload endpoint for snapshots; snapshots go to `output_dir` when unset
    pub upload_url: Option<String>,
    /// Local directory snapshots are written to
    pub output_dir: String,
    /// HTTP timeout for uploads (seconds)
    pub upload_timeout_secs: u64,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            upload_url: None,
            output_dir: "snapshots".to_string(),
            upload_timeout_secs: 30,
            otel_endpoint: None,
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            simulation: SimulationConfig::from_lookup(&lookup)?,
            upload_url: lookup("LIFE_UPLOAD_URL").filter(|url| !url.trim().is_empty()),
            output_dir: lookup("LIFE_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            upload_timeout_secs: parse_or(
                &lookup,
                "LIFE_UPLOAD_TIMEOUT_SECS",
                defaults.upload_timeout_secs,
            )?,
            otel_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

/// Cloud image analyzer configuration
///
/// Credentials are carried as given; nothing checks them until the first
/// request that needs them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Storage account connection string
    pub storage_connection_string: Option<String>,
    /// Container whose blobs are analyzed
    pub container_name: String,
    /// Computer vision subscription key
    pub vision_subscription_key: Option<String>,
    /// Computer vision endpoint, e.g. `https://<name>.cognitiveservices.azure.com/`
    pub vision_endpoint: Option<String>,
    /// Lifetime of issued blob SAS tokens (seconds)
    pub sas_ttl_secs: i64,
    /// HTTP timeout (seconds)
    pub request_timeout_secs: u64,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
}

impl AnalyzerConfig {
    pub const DEFAULT_CONTAINER: &'static str = "gamestatepng";

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        Ok(Self {
            storage_connection_string: lookup("AZURE_STORAGE_CONNECTION_STRING"),
            container_name: lookup("LIFE_CONTAINER_NAME")
                .unwrap_or_else(|| Self::DEFAULT_CONTAINER.to_string()),
            vision_subscription_key: lookup("COMPUTER_VISION_SUBSCRIPTION_KEY"),
            vision_endpoint: lookup("COMPUTER_VISION_ENDPOINT"),
            sas_ttl_secs: parse_or(&lookup, "LIFE_SAS_TTL_SECS", 3600)?,
            request_timeout_secs: parse_or(&lookup, "LIFE_REQUEST_TIMEOUT_SECS", 60)?,
            otel_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
