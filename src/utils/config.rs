// src/utils/config.rs
//! Layered configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional configuration file (TOML, YAML or JSON, by extension)
//! 3. Environment variables `WORLD_RECORDER__<SECTION>__<KEY>`
//!
//! ```toml
//! [event_recorder]
//! enable = true
//! output_dir = "recordings"
//! max_events = 100000
//! default_radius = 0.0
//!
//! [transform]
//! enable = true
//! file_name = "Server_%s.jsonl"
//! max_file_size = 10485760
//! ```

use crate::logging::LogLevel;
use crate::utils::errors::{RecorderError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "WORLD_RECORDER";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Session recorder options
    pub event_recorder: RecorderConfig,

    /// Structured log transform options
    pub transform: TransformConfig,
}

/// Options consumed by the event recorder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Gates every recording entry point
    pub enable: bool,

    /// Directory for session files, created on demand
    pub output_dir: PathBuf,

    /// Hard ceiling of captured events per session
    pub max_events: u32,

    /// Fallback spatial filter radius (0 = unfiltered)
    pub default_radius: f32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enable: false,
            output_dir: PathBuf::from("recordings"),
            max_events: 100_000,
            default_radius: 0.0,
        }
    }
}

impl RecorderConfig {
    /// Validate option ranges
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.default_radius.is_finite() || self.default_radius < 0.0 {
            return Err(format!(
                "default_radius must be a finite, non-negative number (got {})",
                self.default_radius
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("output_dir cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Options consumed by the structured log transform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Install the JSONL layer on the process subscriber
    pub enable: bool,

    /// Directory the log file is written into
    pub log_dir: PathBuf,

    /// File name, may contain a `%s` placeholder
    pub file_name: String,

    /// Rotation threshold in bytes (0 = unbounded)
    pub max_file_size: u64,

    /// Least severe level written
    pub min_level: LogLevel,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            enable: false,
            log_dir: PathBuf::from("logs"),
            file_name: "Server.jsonl".to_string(),
            max_file_size: 0,
            min_level: LogLevel::Info,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("Loading configuration file {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    /// Parse configuration from an in-memory TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self> {
        let parsed: AppConfig = config.try_deserialize()?;

        parsed
            .event_recorder
            .validate()
            .map_err(|msg| RecorderError::Config(config::ConfigError::Message(msg)))?;

        Ok(parsed)
    }
}
