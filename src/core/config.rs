//! Layered application configuration
//!
//! Priority (lowest to highest):
//! 1. Defaults
//! 2. JSON config file (CLI-specified path, or `pubflow.json` in the working directory)
//! 3. CLI arguments (which include env var fallbacks via clap)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_INBOX_CAPACITY, DEFAULT_PORT, DEFAULT_WORKERS,
};
use crate::utils::file::expand_path;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub inbox_capacity: usize,
    pub debug: bool,
}

/// File-based configuration (JSON). Every field is optional so a partial file can
/// layer beneath CLI/env overrides without requiring the whole shape.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    workers: Option<usize>,
    inbox_capacity: Option<usize>,
    debug: Option<bool>,
    #[serde(flatten)]
    extra: serde_json::Value,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
            tracing::warn!(fields = %keys.join(", "), "Unknown fields in config file");
        }
    }
}

impl AppConfig {
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            file_config = FileConfig::load_from_file(&path)?;
            file_config.warn_unknown_fields();
        }

        let host = cli
            .host
            .clone()
            .or(file_config.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_config.port).unwrap_or(DEFAULT_PORT);
        let workers = cli
            .workers
            .or(file_config.workers)
            .unwrap_or(DEFAULT_WORKERS)
            .max(1);
        let inbox_capacity = cli
            .inbox_capacity
            .or(file_config.inbox_capacity)
            .unwrap_or(DEFAULT_INBOX_CAPACITY)
            .max(1);
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                workers,
            },
            inbox_capacity,
            debug,
        })
    }
}
