//! Benchmark configuration.
//!
//! Engine locations are read from a TOML file. Every field has a default,
//! so an absent file or a partial one is fine:
//!
//! ```toml
//! [virtuoso]
//! isql_binary = "/opt/virtuoso/bin/isql"
//! user = "dba"
//! bifc_port = 1113
//! bifc_inc_port = 1114
//!
//! [rdf3x]
//! binary = "rdf3xquery"
//! database = "/data/rdf3x.db"
//!
//! [native]
//! binary = "ServerMain"
//! index = "/data/index"
//!
//! [broccoli]
//! api_url = "http://localhost:7001/"
//! timeout_secs = 300
//! ```
//!
//! The Virtuoso password never lives here; it comes from `--virtuoso-pwd`
//! or `SQB_VIRTUOSO_PWD`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub virtuoso: VirtuosoConfig,
    pub rdf3x: Rdf3xConfig,
    pub native: NativeConfig,
    pub broccoli: BroccoliConfig,
}

/// Virtuoso isql endpoints, one server per text index variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtuosoConfig {
    pub isql_binary: PathBuf,
    pub user: String,
    /// Server with a plain `bif:contains` text index
    pub bifc_port: u16,
    /// Server with the incrementally indexed `<text>` relation
    pub bifc_inc_port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rdf3xConfig {
    pub binary: PathBuf,
    pub database: PathBuf,
}

/// The engine with built-in context search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    pub binary: PathBuf,
    pub index: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroccoliConfig {
    /// Prefix every query is appended to
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for VirtuosoConfig {
    fn default() -> Self {
        Self {
            isql_binary: PathBuf::from("isql"),
            user: "dba".to_string(),
            bifc_port: 1113,
            bifc_inc_port: 1114,
        }
    }
}

impl Default for Rdf3xConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("rdf3xquery"),
            database: PathBuf::from("rdf3x.db"),
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ServerMain"),
            index: PathBuf::from("index"),
        }
    }
}

impl Default for BroccoliConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:7001/".to_string(),
            timeout_secs: 300,
        }
    }
}

impl BroccoliConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BenchConfig {
    /// Load from `path`, else from the default location, else defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `<config dir>/sparqlbench/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sparqlbench").join("config.toml"))
    }
}
