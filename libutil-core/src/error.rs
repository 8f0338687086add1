//! Error types for libutil-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading a bundler config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the config.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error on load, with the file path and toml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A filename or content replacement is not a valid regex.
    #[error("invalid replacement pattern '{pattern}' in group '{group}': {source}")]
    InvalidRegex {
        group: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
