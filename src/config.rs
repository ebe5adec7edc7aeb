//! Configuration loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::session::DEFAULT_MAX_NICK_ATTEMPTS;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server to connect to.
    pub server: ServerConfig,
    /// Who we are on the network.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Retry and retention limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Server address configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host name or address (e.g., "irc.libera.chat").
    pub host: String,
    /// Port (plaintext IRC is usually 6667).
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Desired nickname.
    #[serde(default = "default_nickname")]
    pub nickname: String,
    /// Username (ident).
    #[serde(default = "default_username")]
    pub username: String,
    /// Real name / GECOS.
    #[serde(default = "default_realname")]
    pub realname: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            nickname: default_nickname(),
            username: default_username(),
            realname: default_realname(),
        }
    }
}

/// Retry and retention limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Bound on consecutive 433 nickname collisions before giving up.
    #[serde(default = "default_max_nick_attempts")]
    pub max_nick_attempts: u32,
    /// Entries kept per history target.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Seconds to wait for trailing server messages during disconnect.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_nick_attempts: default_max_nick_attempts(),
            history_limit: default_history_limit(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    6667
}

fn default_nickname() -> String {
    "slirc".to_string()
}

fn default_username() -> String {
    "slirc".to_string()
}

fn default_realname() -> String {
    "Straylight IRC Client".to_string()
}

fn default_max_nick_attempts() -> u32 {
    DEFAULT_MAX_NICK_ATTEMPTS
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_drain_timeout_secs() -> u64 {
    2
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config for `host:port` with default identity and limits.
    pub fn for_server(host: impl Into<String>, port: u16) -> Self {
        Self {
            server: ServerConfig {
                host: host.into(),
                port,
            },
            identity: IdentityConfig::default(),
            limits: LimitsConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if self.identity.nickname.is_empty() {
            return Err(ConfigError::Invalid(
                "identity.nickname must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str("[server]\nhost = \"irc.example.com\"\n").unwrap();
        assert_eq!(config.server.host, "irc.example.com");
        assert_eq!(config.server.port, 6667);
        assert_eq!(config.identity.nickname, "slirc");
        assert_eq!(config.limits.max_nick_attempts, 5);
        assert_eq!(config.limits.history_limit, 100);
        assert_eq!(config.limits.drain_timeout_secs, 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhost = \"irc.example.com\"\nport = 6697\n\n\
             [identity]\nnickname = \"wings\"\n\n\
             [limits]\nhistory_limit = 50"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 6697);
        assert_eq!(config.identity.nickname, "wings");
        assert_eq!(config.identity.username, "slirc"); // default fills in
        assert_eq!(config.limits.history_limit, 50);
    }

    #[test]
    fn test_empty_nickname_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhost = \"irc.example.com\"\n\n[identity]\nnickname = \"\""
        )
        .unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
