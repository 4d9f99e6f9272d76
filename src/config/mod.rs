//! Configuration module for Faultline

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Error tracking configuration
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5100
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database
    pub path: Option<String>,
}

impl DatabaseConfig {
    pub fn get_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            PathBuf::from(path)
        } else {
            get_data_dir().join("errors.db")
        }
    }
}

/// Error tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Global kill switch; when false no reports are stored at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Emit a one-line log record for every stored report
    #[serde(default = "default_true")]
    pub log_to_console: bool,

    /// Per-category intake flags; unlisted categories default to enabled
    #[serde(default)]
    pub categories: HashMap<String, bool>,

    /// Extra category key -> display label entries merged over the defaults
    #[serde(default)]
    pub custom_categories: BTreeMap<String, String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_to_console: true,
            categories: HashMap::new(),
            custom_categories: BTreeMap::new(),
        }
    }
}

/// Get the data directory for Faultline
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("faultline"))
        .unwrap_or_else(|| PathBuf::from(".faultline"))
}

/// Get the config directory for Faultline
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("faultline"))
        .unwrap_or_else(get_data_dir)
}

/// Load configuration from an explicit path, the default location, or defaults
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| get_config_dir().join("config.toml"));

    if config_path.exists() {
        if let Ok(contents) = std::fs::read_to_string(&config_path) {
            match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(err) => {
                    tracing::warn!(path = %config_path.display(), error = %err, "ignoring unparseable config");
                }
            }
        }
    }

    AppConfig::default()
}
