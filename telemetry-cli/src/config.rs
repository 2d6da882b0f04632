//! Configuration loading and parsing
//!
//! A TOML config file can stand in for command-line arguments, carrying
//! the offline conversion job and/or the live listener setup in one place.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Offline pipeline job
    #[serde(default)]
    pub convert: Option<ConvertConfig>,
    /// Live pipeline setup
    #[serde(default)]
    pub listen: Option<ListenConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    /// JSON-lines frame log to decode
    pub log: PathBuf,
    /// DBC file with the message definitions
    pub dbc: PathBuf,
    /// Output artifact path
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Local address to bind, e.g. "127.0.0.1:6000"
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Console subscribers to register before listening
    #[serde(default)]
    pub subscribers: Vec<SubscriberConfig>,
}

/// One console subscriber; mirrors the fields a dashboard widget would be
/// configured with
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberConfig {
    /// Exact signal name to subscribe to
    pub signal: String,
    /// Display label (defaults to the signal name)
    pub label: Option<String>,
    /// Clamp floor for displayed values
    pub min: Option<f64>,
    /// Clamp ceiling for displayed values
    pub max: Option<f64>,
}

pub fn default_addr() -> String {
    // Reference deployment address for the live pipeline
    "127.0.0.1:6000".to_string()
}

/// Load and validate a configuration file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.convert.is_none() && config.listen.is_none() {
        anyhow::bail!(
            "Config file {:?} defines neither a [convert] nor a [listen] section",
            path
        );
    }

    Ok(config)
}
