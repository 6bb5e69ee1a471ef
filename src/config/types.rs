//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::chat::{ChatConfig, MaintenanceConfig};
use super::defaults::{default_database_path, default_server_name};
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Backlog, retention and rate-limit policy.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Background task timing.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: None,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file (`:memory:` for a private in-memory store).
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
[listen]
address = "127.0.0.1:8000"
"#,
        )
        .unwrap();

        assert_eq!(config.server.name, "parlor");
        assert_eq!(config.database.path, "parlor.db");
        assert_eq!(config.chat.timezone, "UTC");
        assert_eq!(config.chat.backlog_limit, 20);
        assert_eq!(config.maintenance.expiry_interval_secs, 60);
        assert_eq!(config.listen.outbound_queue, 64);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
[server]
name = "lobby"
metrics_port = 0

[listen]
address = "0.0.0.0:9000"
max_line_length = 1024

[database]
path = ":memory:"

[chat]
timezone = "Europe/Moscow"
backlog_limit = 5
message_lifetime_minutes = 30
reset_period_minutes = 10
message_limit = 3
"#,
        )
        .unwrap();

        assert_eq!(config.server.metrics_port, Some(0));
        assert_eq!(config.listen.address.port(), 9000);
        assert_eq!(config.listen.max_line_length, 1024);
        assert_eq!(config.chat.timezone, "Europe/Moscow");
        assert_eq!(config.chat.message_limit, 3);
    }

    #[test]
    fn test_missing_listen_fails() {
        assert!(matches!(
            Config::from_toml("[server]\nname = \"x\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[listen]\naddress = \"127.0.0.1:7000\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.listen.address.port(), 7000);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/parlor.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
