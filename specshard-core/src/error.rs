//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {context}: {error}")]
    Json {
        error: serde_json::Error,
        context: String,
    },

    #[error("Failed to load test runner config {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    #[error("Unsupported config file: {0}. Expected a .json or .toml test runner config.")]
    UnsupportedConfig(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    #[error("Cache key is missing required field: {0}")]
    CacheKey(&'static str),

    #[error("Target not found: {name}. Available targets: {available}")]
    TargetNotFound { name: String, available: String },

    #[error("Circular dependency detected: {0}. Use 'specshard graph' to inspect target order.")]
    CircularDependency(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            error,
            context: "targets cache".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
