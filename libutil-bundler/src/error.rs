//! Error types for libutil-bundler.

use std::path::PathBuf;

use thiserror::Error;

use libutil_core::ConfigError;
use libutil_render::RenderError;

/// All errors that can arise from a bundler run.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Config file missing, malformed, or with an invalid entry.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A base, file or ignore glob failed to parse.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Filesystem failure while discovering or reading source files.
    #[error("resolution error at {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Filesystem failure while writing copied files.
    #[error("write error at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`BundleError::Resolve`].
pub(crate) fn resolve_err(path: impl Into<PathBuf>, source: std::io::Error) -> BundleError {
    BundleError::Resolve {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`BundleError::Write`].
pub(crate) fn write_err(path: impl Into<PathBuf>, source: std::io::Error) -> BundleError {
    BundleError::Write {
        path: path.into(),
        source,
    }
}
