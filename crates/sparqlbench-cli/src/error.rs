//! Harness error types

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the benchmark configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Engine output that does not have the expected shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputParseError {
    #[error("line {line}: expected a number but found `{value}`")]
    InvalidNumber { line: usize, value: String },

    #[error("response has no `{field}` field")]
    MissingField { field: &'static str },
}

/// Failure to run one engine over a batch
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("failed to write batch file: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected engine output: {0}")]
    Output(#[from] OutputParseError),

    #[error("{0} requires a password (--virtuoso-pwd or SQB_VIRTUOSO_PWD)")]
    MissingPassword(sparqlbench_query::Dialect),
}
