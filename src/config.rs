//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::websocket::HubConfig;
use crate::worker::DEFAULT_EVENT_CAPACITY;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP / WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3708
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl From<&ServerConfig> for ApiConfig {
    fn from(server: &ServerConfig) -> Self {
        ApiConfig::new(server.host.clone(), server.port)
    }
}

/// Room directory and worker event settings
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    #[serde(default = "default_worker_event_capacity")]
    pub worker_event_capacity: usize,
}

fn default_max_connections() -> usize {
    1000
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_worker_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            outbound_buffer: default_outbound_buffer(),
            worker_event_capacity: default_worker_event_capacity(),
        }
    }
}

impl From<&HubSettings> for HubConfig {
    fn from(hub: &HubSettings) -> Self {
        HubConfig {
            max_connections: hub.max_connections,
            outbound_buffer: hub.outbound_buffer,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Whether logs should be emitted as JSON lines
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Nothing is logged here; call [`LoadedConfig::report`] once the
    /// tracing subscriber is installed.
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("indyscan").join("realtime.toml")),
            Some(PathBuf::from("/etc/indyscan/realtime.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing file in `paths` that parses
    ///
    /// Files that exist but fail to load are skipped and kept in
    /// [`LoadedConfig::skipped`]. Falls back to defaults plus environment.
    pub fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = var("INDYSCAN_SERVER_HOST") {
            self.server.host = host;
        }
        // SERVER_PORT is the older name, kept for existing deployments
        if let Some(port) = var("INDYSCAN_SERVER_PORT").or_else(|| var("SERVER_PORT")) {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Hub overrides
        if let Some(max) = var("INDYSCAN_MAX_CONNECTIONS") {
            if let Ok(m) = max.parse() {
                self.hub.max_connections = m;
            }
        }

        // Logging overrides
        if let Some(level) = var("INDYSCAN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("INDYSCAN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of searching the default config locations
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from; `None` means defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that were found but could not be loaded
    pub skipped: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Log where the config came from and every file that was skipped
    pub fn report(&self) {
        for error in &self.skipped {
            tracing::warn!("Skipping config file: {}", error);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Indyscan Realtime Configuration
#
# Environment variables override these settings:
# - INDYSCAN_SERVER_HOST
# - INDYSCAN_SERVER_PORT (or SERVER_PORT)
# - INDYSCAN_MAX_CONNECTIONS
# - INDYSCAN_LOG_LEVEL
# - INDYSCAN_LOG_FORMAT

[server]
# Host to bind to
host = "0.0.0.0"

# Port serving /ws and the HTTP routes
port = 3708

[hub]
# Maximum concurrent WebSocket connections
max_connections = 1000

# Messages queued per connection before new ones are dropped
outbound_buffer = 256

# Events buffered per worker listener before it lags
worker_event_capacity = 1024

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
