//! Error types for test-split.
//!
//! The partitioning core itself cannot fail. Everything here is raised at the
//! boundary, either while validating options or while reading and writing
//! duration files, before the core ever runs.

use std::path::PathBuf;

/// Invalid split options.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `splits` must be at least 1.
    #[error("the number of splits must be at least 1")]
    ZeroSplits,

    /// `group` is 1-based and must not exceed `splits`.
    #[error("group {group} is out of range, expected a value between 1 and {splits}")]
    GroupOutOfRange { group: usize, splits: usize },

    /// The algorithm name is not one of [`Algorithm::NAMES`](crate::algorithm::Algorithm::NAMES).
    #[error("unknown splitting algorithm '{name}', expected one of: {}", crate::algorithm::Algorithm::NAMES.join(", "))]
    UnknownAlgorithm { name: String },
}

/// Failures while reading, writing or combining duration files.
#[derive(Debug, thiserror::Error)]
pub enum DurationsError {
    #[error("failed to access durations file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed durations in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid durations pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Durations(#[from] DurationsError),
}

pub type Result<T> = std::result::Result<T, Error>;
