//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file, applies environment
//! overrides and validates the result. `AppConfig` is the root configuration
//! struct; its values are handed to constructors at wiring time rather than
//! read from global state.

use serde::Deserialize;
use std::path::Path;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Health and recommendation responses must never be served from a cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Upstream Constants
// =============================================================================

/// Default per-request timeout for upstream coffee API calls
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Default drain window for graceful shutdown
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when neither the CLI nor RUST_LOG set one
pub const DEFAULT_LOG_FILTER: &str = "coffee_service=info,tower_http=info";

/// Default git commit identifier when the build does not inject one
pub const DEFAULT_GIT_COMMIT_SHA: &str = "sha";

/// Header used to correlate requests across services
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Upstream coffee API
    pub coffee_api: CoffeeApiConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Version reported by health endpoints
    #[serde(default = "AppConfig::default_version")]
    pub app_version: String,
    /// Commit reported by health endpoints
    #[serde(default = "AppConfig::default_git_commit_sha")]
    pub git_commit_sha: String,
}

impl AppConfig {
    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn default_git_commit_sha() -> String {
        DEFAULT_GIT_COMMIT_SHA.to_string()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default = "HttpServerConfig::default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl HttpServerConfig {
    fn default_shutdown_grace() -> u64 {
        DEFAULT_SHUTDOWN_GRACE_SECS
    }
}

/// Upstream coffee API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CoffeeApiConfig {
    /// Base URL, e.g. `https://api.sampleapis.com/coffee`
    pub host: String,
    #[serde(default = "CoffeeApiConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl CoffeeApiConfig {
    fn default_timeout() -> u64 {
        DEFAULT_UPSTREAM_TIMEOUT_SECS
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Validation(format!(
                "Unknown logging.format '{}', expected \"text\" or \"json\"",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Filter directive used when neither the CLI nor RUST_LOG provide one
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: Self::default_level(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        DEFAULT_LOG_FILTER.to_string()
    }
}

/// Cross-origin settings for browser clients
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "CorsConfig::default_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Self::default_origins(),
        }
    }
}

impl CorsConfig {
    fn default_origins() -> Vec<String> {
        vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ]
    }
}

impl AppConfig {
    /// Load from a TOML file, apply process environment overrides, then validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without overrides or validation.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `__`-delimited overrides from a key lookup (normally the process
    /// environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(version) = lookup("APP_VERSION") {
            self.app_version = version;
        }
        if let Some(sha) = lookup("GIT_COMMIT_SHA") {
            self.git_commit_sha = sha;
        }
        if let Some(host) = lookup("COFFEE_API__HOST") {
            self.coffee_api.host = host;
        }
        if let Some(host) = lookup("HTTP__HOST") {
            self.http.host = host;
        }
        if let Some(port) = lookup("HTTP__PORT") {
            self.http.port = port.parse().map_err(|e| {
                ConfigError::Validation(format!("Invalid HTTP__PORT '{}': {}", port, e))
            })?;
        }
        if let Some(format) = lookup("LOGGING__FORMAT") {
            self.logging.format = format.parse()?;
        }
        if let Some(level) = lookup("LOGGING__LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "app_version must not be empty".to_string(),
            ));
        }
        if self.git_commit_sha.trim().is_empty() {
            return Err(ConfigError::Validation(
                "git_commit_sha must not be empty".to_string(),
            ));
        }
        if self.coffee_api.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "coffee_api.host must not be empty".to_string(),
            ));
        }
        // Credentialed CORS cannot be combined with a wildcard origin
        if self.cors.allowed_origins.iter().any(|o| o.trim() == "*") {
            return Err(ConfigError::Validation(
                "cors.allowed_origins must list explicit origins, \"*\" is not allowed"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
