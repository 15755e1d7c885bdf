//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the `/api/v1` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where the token pair is persisted
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_file")]
    pub file: String,
}

fn default_session_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("vigil").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./vigil_session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

impl SessionConfig {
    /// Session file with a leading `~/` expanded to the home directory
    pub fn path(&self) -> PathBuf {
        match (self.file.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.file),
        }
    }
}

/// Per-page refresh intervals, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_dashboard_secs")]
    pub dashboard_secs: u64,

    #[serde(default = "default_monitor_secs")]
    pub twitter_secs: u64,

    #[serde(default = "default_monitor_secs")]
    pub wallet_secs: u64,

    #[serde(default = "default_holdings_secs")]
    pub holdings_secs: u64,

    #[serde(default = "default_notifications_secs")]
    pub notifications_secs: u64,
}

fn default_dashboard_secs() -> u64 {
    30
}

fn default_monitor_secs() -> u64 {
    60
}

fn default_holdings_secs() -> u64 {
    300 // 5 minutes
}

fn default_notifications_secs() -> u64 {
    30
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            dashboard_secs: default_dashboard_secs(),
            twitter_secs: default_monitor_secs(),
            wallet_secs: default_monitor_secs(),
            holdings_secs: default_holdings_secs(),
            notifications_secs: default_notifications_secs(),
        }
    }
}

impl PollingConfig {
    fn check(&self) -> Result<(), String> {
        let fields = [
            ("dashboard_secs", self.dashboard_secs),
            ("twitter_secs", self.twitter_secs),
            ("wallet_secs", self.wallet_secs),
            ("holdings_secs", self.holdings_secs),
            ("notifications_secs", self.notifications_secs),
        ];
        match fields.iter().find(|(_, secs)| *secs == 0) {
            Some((name, _)) => Err(format!("polling.{} must be at least 1", name)),
            None => Ok(()),
        }
    }

    pub fn dashboard(&self) -> Duration {
        Duration::from_secs(self.dashboard_secs)
    }

    pub fn twitter(&self) -> Duration {
        Duration::from_secs(self.twitter_secs)
    }

    pub fn wallet(&self) -> Duration {
        Duration::from_secs(self.wallet_secs)
    }

    pub fn holdings(&self) -> Duration {
        Duration::from_secs(self.holdings_secs)
    }

    pub fn notifications(&self) -> Duration {
        Duration::from_secs(self.notifications_secs)
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

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config = Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;
        config.check().map_err(|error| ConfigError::Invalid {
            path: path.to_path_buf(),
            error,
        })?;
        Ok(config)
    }

    /// Reject values the client cannot run with
    fn check(&self) -> Result<(), String> {
        if self.api.request_timeout_secs == 0 {
            return Err("api.request_timeout_secs must be at least 1".to_string());
        }
        self.polling.check()
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
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
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("vigil").join("config.toml")),
            Some(PathBuf::from("/etc/vigil/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("VIGIL_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("VIGIL_REQUEST_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => self.api.request_timeout_secs = secs,
                _ => tracing::warn!(value = %timeout, "Ignoring invalid VIGIL_REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Ok(file) = std::env::var("VIGIL_SESSION_FILE") {
            self.session.file = file;
        }

        if let Ok(level) = std::env::var("VIGIL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("VIGIL_LOG_FORMAT") {
            self.logging.format = format;
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

    #[error("Invalid config file {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Vigil Configuration
#
# Environment variables override these settings:
# - VIGIL_API_URL
# - VIGIL_REQUEST_TIMEOUT_SECS
# - VIGIL_SESSION_FILE
# - VIGIL_LOG_LEVEL
# - VIGIL_LOG_FORMAT

[api]
# Base URL of the monitoring API, including the version prefix
base_url = "http://localhost:8000/api/v1"

# Request timeout in seconds
request_timeout_secs = 10

[session]
# Where the access/refresh token pair is stored
file = "~/.local/share/vigil/session.json"

[polling]
# Refresh intervals per page (seconds)
dashboard_secs = 30
twitter_secs = 60
wallet_secs = 60
holdings_secs = 300
notifications_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intervals() {
        let polling = PollingConfig::default();
        assert_eq!(polling.dashboard(), Duration::from_secs(30));
        assert_eq!(polling.twitter(), Duration::from_secs(60));
        assert_eq!(polling.wallet(), Duration::from_secs(60));
        assert_eq!(polling.holdings(), Duration::from_secs(300));
        assert_eq!(polling.notifications(), Duration::from_secs(30));
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.polling.holdings_secs, 300);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("[api]\nbase_url = \"https://example.test/api/v1\"\n").unwrap();
        assert_eq!(config.api.base_url, "https://example.test/api/v1");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.polling.notifications_secs, 30);
    }

    #[test]
    fn test_session_path_expands_home() {
        let session = SessionConfig {
            file: "~/vigil/session.json".to_string(),
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(session.path(), home.join("vigil/session.json"));
        }

        let session = SessionConfig {
            file: "/tmp/session.json".to_string(),
        };
        assert_eq!(session.path(), PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn test_zero_values_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("zero_poll.toml");
        std::fs::write(&path, "[polling]\nwallet_secs = 0\n").unwrap();
        match Config::load(&path).unwrap_err() {
            ConfigError::Invalid { error, .. } => assert!(error.contains("wallet_secs")),
            other => panic!("unexpected error: {}", other),
        }

        let path = dir.path().join("zero_timeout.toml");
        std::fs::write(&path, "[api]\nrequest_timeout_secs = 0\n").unwrap();
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::Invalid { .. }
        ));

        assert!(Config::default().check().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/vigil.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
