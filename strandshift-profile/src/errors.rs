use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShiftProfileError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Unknown metric: {0}. Expected one of cross-correlation, jaccard-vector, jaccard-bitset, hamming, fragment-variability"
    )]
    UnknownMetric(String),

    #[error("Failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Can't write report {path:?}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ShiftProfileResult<T> = std::result::Result<T, ShiftProfileError>;
