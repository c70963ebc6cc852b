use std::path::PathBuf;

use thiserror::Error;

/// Failures of the ambient layer: loading configuration and persisting the
/// best score.  Gameplay itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    ConfigSyntax {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    ConfigValue {
        field: &'static str,
        reason: &'static str,
    },
    #[error("score file encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
