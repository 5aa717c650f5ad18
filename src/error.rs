use std::path::PathBuf;

use thiserror::Error;

/// Failures of the best-score key-value store.
///
/// These never reach the games: `BestScores` catches them and keeps
/// tracking scores in memory for the rest of the session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("score store is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored value for {key} is not a score: {value:?}")]
    Malformed { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{field} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}
