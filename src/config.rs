//! Runtime configuration.
//!
//! Service settings come from `READMIT_*` environment variables; the
//! database connection is described by a YAML file so the same file can be
//! shared with the data-loading jobs.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const BIND_ADDR_ENV: &str = "READMIT_BIND_ADDR";
pub const MODEL_PATH_ENV: &str = "READMIT_MODEL_PATH";
pub const DB_CONFIG_ENV: &str = "READMIT_DB_CONFIG";
pub const ENABLE_RELOAD_ENV: &str = "READMIT_ENABLE_RELOAD";
pub const REQUIRE_MODEL_DIGEST_ENV: &str = "READMIT_REQUIRE_MODEL_DIGEST";
pub const LOG_MODE_ENV: &str = "READMIT_LOG_MODE";
pub const LOG_FILE_ENV: &str = "READMIT_LOG_FILE";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_MODEL_PATH: &str = "models/readmission_model.json";
const DEFAULT_DB_CONFIG: &str = "data/db_config.yaml";
const DEFAULT_LOG_FILE: &str = "logs/readmit.log";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Database connection settings (`db_config.yaml`).
///
/// ```yaml
/// db_type: sqlite
/// database: data/readmission.db
/// read_only: true
/// attach:
///   clinical: data/clinical.db
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_type: String,
    /// Database path, or `:memory:`
    pub database: String,
    pub read_only: bool,
    /// Schema name -> database file, for schema-qualified dimension tables
    pub attach: BTreeMap<String, String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            database: ":memory:".to_string(),
            read_only: false,
            attach: BTreeMap::new(),
        }
    }
}

impl StoreConfig {
    /// Parse from YAML text.
    ///
    /// # Errors
    /// Returns `ConfigError::Yaml` on malformed input.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }
}

/// Where formatted log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMode {
    Stdout,
    File(PathBuf),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub model_path: PathBuf,
    pub db_config_path: PathBuf,
    /// Expose `POST /admin/reload-dimensions`
    pub enable_reload: bool,
    /// Refuse to load a model without a `.sha256` sidecar
    pub require_model_digest: bool,
    pub log_mode: LogMode,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: BIND_ADDR_ENV,
                value: bind_raw.clone(),
            })?;

        let log_mode = match lookup(LOG_MODE_ENV).as_deref().map(str::trim) {
            None | Some("stdout") | Some("") => LogMode::Stdout,
            Some("file") => LogMode::File(PathBuf::from(
                lookup(LOG_FILE_ENV).unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            )),
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_MODE_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            model_path: PathBuf::from(
                lookup(MODEL_PATH_ENV).unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
            ),
            db_config_path: PathBuf::from(
                lookup(DB_CONFIG_ENV).unwrap_or_else(|| DEFAULT_DB_CONFIG.to_string()),
            ),
            enable_reload: parse_bool(lookup(ENABLE_RELOAD_ENV)),
            require_model_digest: parse_bool(lookup(REQUIRE_MODEL_DIGEST_ENV)),
            log_mode,
        })
    }
}

fn parse_bool(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).expect("Should build");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8000");
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(!config.enable_reload);
        assert!(!config.require_model_digest);
        assert_eq!(config.log_mode, LogMode::Stdout);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (BIND_ADDR_ENV, "0.0.0.0:9000"),
            (ENABLE_RELOAD_ENV, "yes"),
            (LOG_MODE_ENV, "file"),
            (LOG_FILE_ENV, "/tmp/r.log"),
        ]))
        .expect("Should build");
        assert_eq!(config.bind_addr.port(), 9000);
        assert!(config.enable_reload);
        assert_eq!(config.log_mode, LogMode::File(PathBuf::from("/tmp/r.log")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup_from(&[(BIND_ADDR_ENV, "nope")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(LOG_MODE_ENV, "syslog")])).is_err());
    }

    #[test]
    fn test_store_config_yaml() {
        let yaml = r"
db_type: sqlite
database: data/readmission.db
read_only: true
attach:
  clinical: data/clinical.db
";
        let config = StoreConfig::from_yaml(yaml).expect("Should parse");
        assert_eq!(config.db_type, "sqlite");
        assert!(config.read_only);
        assert_eq!(config.attach.get("clinical").map(String::as_str), Some("data/clinical.db"));
    }

    #[test]
    fn test_store_config_defaults_and_missing_file() {
        let config = StoreConfig::from_yaml("{}").expect("Should parse");
        assert_eq!(config, StoreConfig::default());

        let err = StoreConfig::load(Path::new("/nonexistent/db_config.yaml"));
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }
}
