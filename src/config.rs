//! Application configuration.
//!
//! Layers, later wins: built-in defaults, an optional TOML file, then environment
//! variables.
//!
//! ```toml
//! [store]
//! kind = "file"
//! dir = "/var/lib/todo-actors"
//!
//! [runtime]
//! idle_timeout_ms = 60000
//! write_through = true
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `TODO_ACTORS_STORE_DIR` | `store` (switches to the file store) |
//! | `TODO_ACTORS_IDLE_TIMEOUT_MS` | `runtime.idle_timeout_ms` (`0` disables) |
//! | `TODO_ACTORS_MAILBOX_CAPACITY` | `runtime.mailbox_capacity` |
//! | `TODO_ACTORS_WRITE_THROUGH` | `runtime.write_through` |

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use virtual_actors::RuntimeConfig;

pub const ENV_STORE_DIR: &str = "TODO_ACTORS_STORE_DIR";
pub const ENV_IDLE_TIMEOUT_MS: &str = "TODO_ACTORS_IDLE_TIMEOUT_MS";
pub const ENV_MAILBOX_CAPACITY: &str = "TODO_ACTORS_MAILBOX_CAPACITY";
pub const ENV_WRITE_THROUGH: &str = "TODO_ACTORS_WRITE_THROUGH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

/// Where task lists are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Process-local; lost on exit.
    Memory,
    /// One JSON file per user under `dir`.
    File { dir: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            dir: PathBuf::from("todo-data"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub runtime: RuntimeConfig,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_STORE_DIR).filter(|d| !d.is_empty()) {
            self.store = StoreConfig::File {
                dir: PathBuf::from(dir),
            };
        }
        if let Some(raw) = lookup(ENV_IDLE_TIMEOUT_MS) {
            self.runtime.idle_timeout_ms = Some(parse(ENV_IDLE_TIMEOUT_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_MAILBOX_CAPACITY) {
            self.runtime.mailbox_capacity = parse(ENV_MAILBOX_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WRITE_THROUGH) {
            self.runtime.write_through = parse_bool(ENV_WRITE_THROUGH, &raw)?;
        }
        Ok(())
    }
}

fn parse<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
        }),
    }
}

/// Loads the configuration: defaults, then `path` if given, then the environment.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            AppConfig::from_toml_str(&contents, path)?
        }
        None => AppConfig::default(),
    };
    config.apply_overrides_from(|var| std::env::var(var).ok())?;
    Ok(config)
}
