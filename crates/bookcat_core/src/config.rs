//! Runtime configuration for the catalog core.
//!
//! # Responsibility
//! - Describe connection-provider and logging settings in one place.
//! - Load settings from serde-compatible documents or `BOOKCAT_*` env vars.
//!
//! # Invariants
//! - Every field has a usable default; an empty document is valid.
//! - `validate()` must pass before the config reaches `ConnectionPool::init`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const ENV_DB_PATH: &str = "BOOKCAT_DB_PATH";
const ENV_DB_MAX_CONNECTIONS: &str = "BOOKCAT_DB_MAX_CONNECTIONS";
const ENV_DB_ACQUIRE_TIMEOUT_MS: &str = "BOOKCAT_DB_ACQUIRE_TIMEOUT_MS";
const ENV_LOG_LEVEL: &str = "BOOKCAT_LOG_LEVEL";
const ENV_LOG_DIR: &str = "BOOKCAT_LOG_DIR";

const DEFAULT_MAX_CONNECTIONS: usize = 4;
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
    ZeroPoolSize,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
            Self::ZeroPoolSize => write!(f, "database.max_connections must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

/// Connection provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file. `None` selects a private in-memory database.
    pub path: Option<PathBuf>,
    /// Upper bound on simultaneously open connections.
    pub max_connections: usize,
    /// How long `acquire()` waits for a free connection.
    pub acquire_timeout_ms: u64,
    /// SQLite busy handler timeout applied to every connection.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }
}

/// Logging backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files. `None` logs to stderr.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl CatalogConfig {
    /// Builds config from process environment on top of defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup on top of defaults.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.database.path = Some(PathBuf::from(path));
        }
        if let Some(value) = read(ENV_DB_MAX_CONNECTIONS) {
            config.database.max_connections = parse_number(ENV_DB_MAX_CONNECTIONS, &value)?;
        }
        if let Some(value) = read(ENV_DB_ACQUIRE_TIMEOUT_MS) {
            config.database.acquire_timeout_ms = parse_number(ENV_DB_ACQUIRE_TIMEOUT_MS, &value)?;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.logging.dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{CatalogConfig, ConfigError, DatabaseConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config: CatalogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.database.path, None);
        assert_eq!(config.database.max_connections, 4);
    }

    #[test]
    fn partial_document_overrides_selected_fields() {
        let config: CatalogConfig = serde_json::from_str(
            r#"{"database": {"path": "/tmp/books.sqlite3", "max_connections": 2}}"#,
        )
        .unwrap();
        assert_eq!(
            config.database.path,
            Some(PathBuf::from("/tmp/books.sqlite3"))
        );
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(
            config.database.acquire_timeout_ms,
            DatabaseConfig::default().acquire_timeout_ms
        );
    }

    #[test]
    fn lookup_reads_bookcat_keys_and_ignores_blank_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BOOKCAT_DB_PATH", "/var/lib/bookcat/catalog.db"),
            ("BOOKCAT_DB_MAX_CONNECTIONS", " 3 "),
            ("BOOKCAT_LOG_LEVEL", "warn"),
            ("BOOKCAT_LOG_DIR", "   "),
        ]);
        let config =
            CatalogConfig::from_lookup(|key| env.get(key).map(|value| value.to_string())).unwrap();

        assert_eq!(
            config.database.path,
            Some(PathBuf::from("/var/lib/bookcat/catalog.db"))
        );
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir, None);
    }

    #[test]
    fn lookup_rejects_non_numeric_and_zero_pool_size() {
        let err = CatalogConfig::from_lookup(|key| {
            (key == "BOOKCAT_DB_MAX_CONNECTIONS").then(|| "many".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "BOOKCAT_DB_MAX_CONNECTIONS",
                ..
            }
        ));

        let err = CatalogConfig::from_lookup(|key| {
            (key == "BOOKCAT_DB_MAX_CONNECTIONS").then(|| "0".to_string())
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroPoolSize);
    }
}
