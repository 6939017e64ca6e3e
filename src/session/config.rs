// Session configuration file and stores
//
// The session file carries the ambient connection established by `connect`
// plus timeout and output defaults.

use crate::output::OutputFormat;
use crate::session::connection::ConnectionSettings;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Session configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse session configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize session configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Invalid timeout {field}: must be greater than zero")]
    InvalidTimeout { field: &'static str },

    #[error("No configuration directory is available on this platform")]
    NoConfigDirectory,
}

/// Persisted session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionSettings>,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

impl SessionConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(connection) = &self.connection {
            connection.validate()?;
        }
        self.timeouts.validate()
    }
}

/// Default timeouts, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    #[serde(default = "default_timeout_secs")]
    pub default_secs: u64,
    #[serde(default = "default_long_running_secs")]
    pub long_running_secs: u64,
}

impl TimeoutSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.default_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "default_secs",
            });
        }
        if self.long_running_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "long_running_secs",
            });
        }
        Ok(())
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            default_secs: default_timeout_secs(),
            long_running_secs: default_long_running_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_timeout_secs() -> u64 { 60 }
fn default_long_running_secs() -> u64 { 300 }

/// Where the ambient session configuration is kept
#[async_trait]
pub trait SessionConfigStore: Send + Sync {
    /// Load the configuration; a store that was never written yields defaults
    async fn load(&self) -> ConfigResult<SessionConfig>;

    /// Persist the configuration
    async fn save(&self, config: &SessionConfig) -> ConfigResult<()>;
}

/// TOML file store
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/clusteradm/session.toml`
    pub fn at_default_location() -> ConfigResult<Self> {
        Ok(Self::new(default_session_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_toml(content: &str) -> ConfigResult<SessionConfig> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn serialize_toml(config: &SessionConfig) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(config)?)
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SessionConfigStore for FileSessionStore {
    async fn load(&self) -> ConfigResult<SessionConfig> {
        if !tokio::fs::try_exists(&self.path).await.map_err(|e| self.io_error(e))? {
            debug!("no session file at {}; using defaults", self.path.display());
            return Ok(SessionConfig::default());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Self::parse_toml(&content)
    }

    async fn save(&self, config: &SessionConfig) -> ConfigResult<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let content = Self::serialize_toml(config)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| self.io_error(e))?;
        debug!("saved session configuration to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store for embedding and tests
#[derive(Default)]
pub struct MemorySessionStore {
    config: RwLock<SessionConfig>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    pub fn with_connection(settings: ConnectionSettings) -> Self {
        Self::with_config(SessionConfig {
            connection: Some(settings),
            ..SessionConfig::default()
        })
    }
}

#[async_trait]
impl SessionConfigStore for MemorySessionStore {
    async fn load(&self) -> ConfigResult<SessionConfig> {
        Ok(self.config.read().await.clone())
    }

    async fn save(&self, config: &SessionConfig) -> ConfigResult<()> {
        config.validate()?;
        *self.config.write().await = config.clone();
        Ok(())
    }
}

/// Default location of the session file
pub fn default_session_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("clusteradm").join("session.toml"))
        .ok_or(ConfigError::NoConfigDirectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::connection::Credential;

    #[test]
    fn test_parse_full_file() {
        let content = r#"
[connection]
endpoints = ["cluster.example.com:19000", "cluster.example.com:19001"]

[connection.credential]
kind = "certificate"
thumbprint = "AB12CD"
server_common_name = "cluster.example.com"

[timeouts]
default_secs = 30

[output]
format = "json"
"#;
        let config = FileSessionStore::parse_toml(content).unwrap();
        let connection = config.connection.unwrap();
        assert_eq!(connection.endpoints.len(), 2);
        assert!(matches!(connection.credential, Credential::Certificate { .. }));
        assert_eq!(config.timeouts.default_secs, 30);
        assert_eq!(config.timeouts.long_running_secs, 300);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_empty_file_has_no_connection() {
        let config = FileSessionStore::parse_toml("").unwrap();
        assert!(config.connection.is_none());
        assert_eq!(config.timeouts, TimeoutSettings::default());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = FileSessionStore::parse_toml("[timeouts]\ndefault_secs = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidTimeout { .. })));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().connection.is_none());

        let config = SessionConfig {
            connection: Some(ConnectionSettings::new(vec!["localhost:19000".to_string()])),
            ..SessionConfig::default()
        };
        store.save(&config).await.unwrap();
        assert_eq!(store.load().await.unwrap(), config);
    }
}
