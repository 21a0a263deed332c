//! Store configuration.
//!
//! # Responsibility
//! - Describe how the store database is opened (path, lock wait, journal).
//! - Carry logging settings for process bootstrap.
//! - Load settings from `FORUM_*` environment variables.
//!
//! # Invariants
//! - Missing optional variables fall back to defaults.
//! - Present but malformed variables are rejected, never silently ignored.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "FORUM_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "FORUM_BUSY_TIMEOUT_MS";
pub const ENV_WAL: &str = "FORUM_WAL";
pub const ENV_LOG_LEVEL: &str = "FORUM_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FORUM_LOG_DIR";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value `{}` for {}", self.value, self.variable)
    }
}

impl Error for ConfigError {}

/// Settings used to open and operate the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    pub db_path: Option<PathBuf>,
    /// Upper bound on how long a write waits for the database lock.
    pub busy_timeout_ms: u64,
    /// Use WAL journaling for file databases so readers never block writers.
    pub wal: bool,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            wal: true,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Default settings for a database file at `path`.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Builds a config from `FORUM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = non_blank(lookup(ENV_BUSY_TIMEOUT_MS)) {
            config.busy_timeout_ms = raw.parse().map_err(|_| ConfigError {
                variable: ENV_BUSY_TIMEOUT_MS,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = non_blank(lookup(ENV_WAL)) {
            config.wal = parse_flag(&raw).ok_or(ConfigError {
                variable: ENV_WAL,
                value: raw.clone(),
            })?;
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_WAL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(config.db_path.is_none());
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/var/lib/forum/forum.db"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_WAL, "off"),
        ]))
        .unwrap();
        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/var/lib/forum/forum.db"))
        );
        assert_eq!(config.busy_timeout_ms, 250);
        assert!(!config.wal);
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert_eq!(err.variable, ENV_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn config_deserializes_with_missing_fields() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"db_path": "/tmp/forum.db"}"#).unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/forum.db")));
        assert!(config.wal);
    }
}
