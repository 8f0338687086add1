//! Error types for libutil-generator.

use std::path::PathBuf;

use thiserror::Error;

use libutil_render::RenderError;

/// All errors that can arise from a `generate_file` call.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An earlier write queued for the same path failed; this one never ran.
    #[error("write to {path} aborted: an earlier queued write failed: {reason}")]
    Aborted { path: PathBuf, reason: String },

    /// The call driving this path's queue was dropped before this write ran.
    #[error("write to {path} cancelled: queue driver dropped")]
    Cancelled { path: PathBuf },
}

/// Convenience constructor for [`GenerateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GenerateError {
    GenerateError::Io {
        path: path.into(),
        source,
    }
}
