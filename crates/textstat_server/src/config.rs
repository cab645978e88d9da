//! Server configuration with layered loading.
//!
//! # Load Order
//!
//! 1. Compiled defaults
//! 2. TOML file (`--config` or `TEXTSTAT_CONFIG`)
//! 3. Environment variables (`TEXTSTAT_*`)
//!
//! Each layer overrides the previous.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_CONFIG_PATH: &str = "TEXTSTAT_CONFIG";
pub const ENV_BIND_ADDR: &str = "TEXTSTAT_BIND_ADDR";
pub const ENV_DB_PATH: &str = "TEXTSTAT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TEXTSTAT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TEXTSTAT_LOG_DIR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Static bearer token mapped to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub subject: String,
    /// Free-form; roles unknown to the policy are granted nothing.
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// `None` keeps the store in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_path: None,
            log_level: textstat_core::default_log_level().to_string(),
            log_dir: None,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|err| ConfigError::invalid("bind_addr", format!("{err}")))
    }

    /// Checks cross-field constraints after all layers are merged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        let mut seen = BTreeSet::new();
        for (index, entry) in self.auth.tokens.iter().enumerate() {
            let key = format!("auth.tokens[{index}]");
            if entry.token.trim().is_empty() {
                return Err(ConfigError::invalid(key, "token must not be empty"));
            }
            if entry.subject.trim().is_empty() {
                return Err(ConfigError::invalid(key, "subject must not be empty"));
            }
            if !seen.insert(entry.token.as_str()) {
                return Err(ConfigError::invalid(key, "duplicate token"));
            }
        }
        Ok(())
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    skip_env: bool,
    env_override: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads this file; unlike the env-provided path, it must exist.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Reads `TEXTSTAT_*` values from `vars` instead of the process environment.
    #[must_use]
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env_override = Some(vars);
        self
    }

    pub fn load(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = ServerConfig::default();

        if let Some(path) = self.config_path.as_deref() {
            config = load_file(path)?;
        } else if let Some(path) = self.env_var(ENV_CONFIG_PATH) {
            let path = PathBuf::from(path);
            if path.exists() {
                config = load_file(&path)?;
            } else {
                log::warn!(
                    "event=config_load module=config status=skipped reason=missing_file path={}",
                    path.display()
                );
            }
        }

        self.apply_env_vars(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn env_var(&self, key: &str) -> Option<String> {
        if self.skip_env {
            return None;
        }
        let value = match self.env_override.as_ref() {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|value| !value.trim().is_empty())
    }

    fn apply_env_vars(&self, config: &mut ServerConfig) {
        if let Some(value) = self.env_var(ENV_BIND_ADDR) {
            config.bind_addr = value;
        }
        if let Some(value) = self.env_var(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = self.env_var(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = self.env_var(ENV_LOG_DIR) {
            config.log_dir = Some(value);
        }
    }
}

fn load_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    ServerConfig::from_toml(&content).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConfigLoader, ServerConfig, ENV_BIND_ADDR, ENV_DB_PATH};
    use std::collections::HashMap;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"
bind_addr = "0.0.0.0:8080"
db_path = "/var/lib/textstat/texts.db"
log_level = "warn"

[[auth.tokens]]
token = "secret-user"
subject = "alice"
role = "user"

[[auth.tokens]]
token = "secret-admin"
subject = "root"
role = "admin"
"#;

    #[test]
    fn defaults_are_valid() {
        let config = ConfigLoader::new().skip_env_vars().load().unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert!(config.db_path.is_none());
        assert!(config.auth.tokens.is_empty());
    }

    #[test]
    fn file_layer_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textstat.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ConfigLoader::new()
            .with_config_file(&path)
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.auth.tokens.len(), 2);
        assert_eq!(config.auth.tokens[1].role, "admin");
    }

    #[test]
    fn env_layer_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textstat.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let env = HashMap::from([
            (ENV_BIND_ADDR.to_string(), "127.0.0.1:9999".to_string()),
            (ENV_DB_PATH.to_string(), "/tmp/other.db".to_string()),
        ]);
        let config = ConfigLoader::new()
            .with_config_file(&path)
            .with_env(env)
            .load()
            .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9999");
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .with_config_file("/nonexistent/textstat.toml")
            .skip_env_vars()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "bind_addr = [").unwrap();

        let err = ConfigLoader::new()
            .with_config_file(&path)
            .skip_env_vars()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn validate_rejects_bad_bind_addr_and_duplicate_tokens() {
        let config = ServerConfig {
            bind_addr: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "bind_addr"
        ));

        let mut config = ServerConfig::from_toml(SAMPLE).unwrap();
        config.auth.tokens[1].token = "secret-user".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate token"));
    }
}
